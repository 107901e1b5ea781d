//! Configuration file loading for bitbucket-mcp
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables (`BITBUCKET_*`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./bitbucket-mcp.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/bitbucket-mcp/config.toml`
//! 5. Default values

mod file_config;
mod loader;
mod source;

pub use file_config::{
    ConfigValidationError, FileBitbucketConfig, FileConfig, FileOutputConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_CONFIG_FILE};
pub use source::FileConfigSource;
