//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use bbmcp_domain::{Credential, GatewayConfig, OutputFormat};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("timeout_ms cannot be 0")]
    InvalidTimeout,

    #[error("base_url must be an absolute http(s) URL, got '{0}'")]
    InvalidBaseUrl(String),
}

/// Raw `[bitbucket]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBitbucketConfig {
    /// Account email used for Basic auth
    #[serde(deserialize_with = "string_from_scalar")]
    pub email: Option<String>,
    /// API token paired with `email`
    #[serde(deserialize_with = "string_from_scalar")]
    pub api_token: Option<String>,
    /// API root, e.g. `https://api.bitbucket.org/2.0`
    #[serde(deserialize_with = "string_from_scalar")]
    pub base_url: Option<String>,
    /// Per-attempt request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Accept any scalar for a string setting.
///
/// The environment provider types values it can parse, so a token made of
/// digits arrives as an integer and `true` as a bool.
fn string_from_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

/// Raw `[output]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Default rendering when a call does not pass `output_format`
    pub format: Option<OutputFormat>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub bitbucket: FileBitbucketConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate and convert into the domain configuration record.
    pub fn into_gateway_config(self) -> Result<GatewayConfig, ConfigValidationError> {
        let FileConfig { bitbucket, output } = self;
        let mut config = GatewayConfig::default();

        if let Some(timeout_ms) = bitbucket.timeout_ms {
            if timeout_ms == 0 {
                return Err(ConfigValidationError::InvalidTimeout);
            }
            config = config.with_timeout_ms(timeout_ms);
        }

        if let Some(base_url) = bitbucket.base_url.filter(|u| !u.trim().is_empty()) {
            let valid = Url::parse(&base_url)
                .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host());
            if !valid {
                return Err(ConfigValidationError::InvalidBaseUrl(base_url));
            }
            config = config.with_base_url(base_url);
        }

        let has_email = bitbucket.email.as_deref().is_some_and(|s| !s.trim().is_empty());
        let has_token = bitbucket.api_token.as_deref().is_some_and(|s| !s.trim().is_empty());
        match Credential::from_parts(bitbucket.email, bitbucket.api_token) {
            Some(credential) => config = config.with_credential(credential),
            None if has_email || has_token => {
                warn!("Only one of email/api_token is set; requests will be unauthenticated")
            }
            None => {}
        }

        config.default_output = output.format.unwrap_or_default();
        Ok(config)
    }
}
