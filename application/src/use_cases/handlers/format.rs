//! Text rendering helpers shared by the handlers.

use bbmcp_domain::util::{preview, truncate_str};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Text bodies (diffs, files, logs) above this size are cut with a note.
pub const MAX_TEXT_BYTES: usize = 100_000;

/// Width of one-line previews for descriptions and comment bodies.
pub const PREVIEW_BYTES: usize = 160;

/// String at a JSON Pointer, or `fallback`.
pub fn str_at<'a>(value: &'a Value, pointer: &str, fallback: &'a str) -> &'a str {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
}

/// Display form of a scalar at a JSON Pointer (numbers and bools included).
pub fn scalar_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `2024-03-01T12:00:00.123456+00:00` → `2024-03-01 12:00 UTC`.
/// Unparseable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Date at a JSON Pointer, formatted, or `-`.
pub fn date_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(format_date)
        .unwrap_or_else(|| "-".to_string())
}

/// Short commit hash (12 chars).
pub fn short_hash(hash: &str) -> &str {
    truncate_str(hash, 12)
}

/// One-line preview of free text at a JSON Pointer.
pub fn preview_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(|s| preview(s, PREVIEW_BYTES))
        .filter(|s| !s.is_empty())
}

/// `key: value` lines for the fields that are present.
pub fn field_lines(value: &Value, fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .filter_map(|(label, pointer)| scalar_at(value, pointer).map(|v| format!("{label}: {v}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Footer describing where a listing page sits.
pub fn page_footer(page: &bbmcp_domain::Page<Value>) -> String {
    let mut parts = vec![format!("{} item(s)", page.values.len())];
    if let Some(n) = page.page {
        parts.push(format!("page {n}"));
    }
    if let Some(size) = page.size {
        parts.push(format!("{size} total"));
    }
    if page.has_next() {
        parts.push("more available (use 'page')".to_string());
    }
    format!("({})", parts.join(", "))
}

/// Render a heading, one line per item, then the footer.
pub fn listing(
    heading: &str,
    page: &bbmcp_domain::Page<Value>,
    line: impl Fn(&Value) -> String,
) -> String {
    if page.values.is_empty() {
        return format!("{heading}\n(no results)");
    }
    let body = page.values.iter().map(&line).collect::<Vec<_>>().join("\n");
    format!("{heading}\n{body}\n{}", page_footer(page))
}

/// Cut an oversized text body and say so.
pub fn clip_text(body: &str) -> String {
    let cut = truncate_str(body, MAX_TEXT_BYTES);
    if cut.len() < body.len() {
        format!(
            "{cut}\n\n[truncated: showing {} of {} bytes]",
            cut.len(),
            body.len()
        )
    } else {
        body.to_string()
    }
}
