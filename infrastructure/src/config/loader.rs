//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level configuration file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "bitbucket-mcp.toml";

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "BITBUCKET_";

/// Environment keys (after the prefix) mapped into the `[bitbucket]` section.
const ENV_KEYS: [&str; 4] = ["email", "api_token", "base_url", "timeout_ms"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `BITBUCKET_EMAIL`, `BITBUCKET_API_TOKEN`,
    ///    `BITBUCKET_BASE_URL`, `BITBUCKET_TIMEOUT_MS`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./bitbucket-mcp.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/bitbucket-mcp/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, true).extract().map_err(Box::new)
    }

    /// Defaults plus environment, ignoring every file (for --no-config)
    pub fn load_env_only() -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(None, false).extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&Path>, use_files: bool) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if use_files {
            if let Some(global_path) = Self::global_config_path()
                && global_path.exists()
            {
                figment = figment.merge(Toml::file(&global_path));
            }

            if let Some(path) = Self::project_config_path() {
                figment = figment.merge(Toml::file(&path));
            }

            if let Some(path) = config_path {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.merge(Self::env_provider())
    }

    /// `BITBUCKET_<KEY>` → `bitbucket.<key>`
    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX)
            .only(&ENV_KEYS)
            .map(|key| format!("bitbucket.{}", key.as_str()).into())
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/bitbucket-mcp/config.toml if set,
    /// otherwise falls back to ~/.config/bitbucket-mcp/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("bitbucket-mcp").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        let path = PathBuf::from(PROJECT_CONFIG_FILE);
        path.exists().then_some(path)
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        let set: Vec<String> = ENV_KEYS
            .iter()
            .map(|k| format!("{}{}", ENV_PREFIX, k.to_ascii_uppercase()))
            .filter(|var| std::env::var_os(var).is_some())
            .collect();
        if set.is_empty() {
            println!("  [     ] Env:     {}*", ENV_PREFIX);
        } else {
            println!("  [FOUND] Env:     {}", set.join(", "));
        }

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./{}", PROJECT_CONFIG_FILE);
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}
