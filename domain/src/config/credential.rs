//! Upstream credential

use std::fmt;

/// Account identifier plus secret token, used for HTTP Basic auth.
///
/// Only constructible with both parts present; a missing credential means
/// unauthenticated (public-only) access.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    account: String,
    token: String,
}

impl Credential {
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
        }
    }

    /// Build a credential only if both parts are present and non-empty.
    pub fn from_parts(account: Option<String>, token: Option<String>) -> Option<Self> {
        let account = account.filter(|a| !a.trim().is_empty())?;
        let token = token.filter(|t| !t.trim().is_empty())?;
        Some(Self::new(account, token))
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

// Never print the token.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("account", &self.account)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_requires_both() {
        assert!(Credential::from_parts(Some("a@b.com".into()), Some("tok".into())).is_some());
        assert!(Credential::from_parts(Some("a@b.com".into()), None).is_none());
        assert!(Credential::from_parts(None, Some("tok".into())).is_none());
        assert!(Credential::from_parts(Some("".into()), Some("tok".into())).is_none());
        assert!(Credential::from_parts(Some("a@b.com".into()), Some("  ".into())).is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("a@b.com", "super-secret");
        let debug = format!("{:?}", cred);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("super-secret"));
    }
}
