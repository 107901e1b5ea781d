//! Shared text helpers for result formatting.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview of free text (comment bodies, descriptions).
///
/// Collapses whitespace and appends `…` when the text was cut.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_str(&collapsed, max_bytes);
    if cut.len() < collapsed.len() {
        format!("{}…", cut.trim_end())
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_no_op_when_short() {
        assert_eq!(truncate_str("hi", 10), "hi");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        // 'é' is 2 bytes; cutting inside it backs up
        assert_eq!(truncate_str("café", 4), "caf");
        assert_eq!(truncate_str("café", 5), "café");
    }

    #[test]
    fn test_preview_collapses_and_marks_truncation() {
        assert_eq!(preview("line one\n\nline   two", 100), "line one line two");
        assert_eq!(preview("abcdef ghijkl", 6), "abcdef…");
        assert_eq!(preview("", 10), "");
    }
}
