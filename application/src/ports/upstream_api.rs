//! Upstream API port
//!
//! The two request primitives (JSON and text) plus the pagination walker,
//! as seen by the tool handlers. The infrastructure adapter owns
//! authentication, timeouts, retry and error classification; handlers only
//! build URLs and format results.

use async_trait::async_trait;
use bbmcp_domain::{GatewayConfig, GatewayError, RequestOptions};

/// Port for read-only access to the upstream REST API.
///
/// Every method takes the [`GatewayConfig`] resolved for the current tool
/// call; implementations must not cache configuration between calls.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Fetch `url` and decode the body as JSON.
    async fn get_json(
        &self,
        config: &GatewayConfig,
        url: &str,
        options: RequestOptions,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Fetch `url` and return the raw body (diffs, logs, file content).
    async fn get_text(
        &self,
        config: &GatewayConfig,
        url: &str,
        options: RequestOptions,
    ) -> Result<String, GatewayError>;

    /// Follow `next` links from `url` and return every item of every page.
    async fn get_all_pages(
        &self,
        config: &GatewayConfig,
        url: &str,
    ) -> Result<Vec<serde_json::Value>, GatewayError>;
}
