//! Configuration value objects for the domain layer
//!
//! [`GatewayConfig`] is the explicit record every tool call resolves before
//! touching the network. It is never cached between calls.

mod credential;
mod gateway_config;
mod output_format;

pub use credential::Credential;
pub use gateway_config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, GatewayConfig};
pub use output_format::OutputFormat;
