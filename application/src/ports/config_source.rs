//! Configuration source port
//!
//! Configuration is resolved at the start of every tool call instead of
//! once at startup, so environment changes between calls are honored.

use bbmcp_domain::GatewayConfig;
use thiserror::Error;

/// Errors that can occur while resolving configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Port for resolving the current [`GatewayConfig`].
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<GatewayConfig, ConfigError>;
}

/// A fixed configuration. Used by one-shot commands and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    config: GatewayConfig,
}

impl StaticConfigSource {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

impl ConfigSource for StaticConfigSource {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        Ok(self.config.clone())
    }
}
