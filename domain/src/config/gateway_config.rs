//! Resolved gateway configuration record

use super::{Credential, OutputFormat};
use std::time::Duration;

/// Bitbucket Cloud REST API root.
pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org/2.0";

/// Per-attempt request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Everything a request needs to know about its environment.
///
/// Resolved fresh at the start of every tool call so that environment
/// changes between calls are honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub credential: Option<Credential>,
    pub base_url: String,
    pub timeout_ms: u64,
    pub default_output: OutputFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            credential: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            default_output: OutputFormat::default(),
        }
    }
}

impl GatewayConfig {
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.is_authenticated());
    }
}
