//! File- and environment-backed [`ConfigSource`].

use super::loader::ConfigLoader;
use bbmcp_application::ports::config_source::{ConfigError, ConfigSource};
use bbmcp_domain::GatewayConfig;
use std::path::PathBuf;
use tracing::debug;

/// Re-runs the full figment merge on every [`load`](ConfigSource::load).
#[derive(Debug, Clone, Default)]
pub struct FileConfigSource {
    config_path: Option<PathBuf>,
    use_files: bool,
}

impl FileConfigSource {
    /// Files plus environment, with an optional explicit file.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            use_files: true,
        }
    }

    /// Environment only (for --no-config).
    pub fn env_only() -> Self {
        Self {
            config_path: None,
            use_files: false,
        }
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        let file_config = if self.use_files {
            ConfigLoader::load(self.config_path.as_deref())
        } else {
            ConfigLoader::load_env_only()
        }
        .map_err(|e| ConfigError::Load(e.to_string()))?;

        let config = file_config
            .into_gateway_config()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            authenticated = config.is_authenticated(),
            "Resolved configuration"
        );
        Ok(config)
    }
}
