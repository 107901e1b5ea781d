//! Bitbucket Cloud adapter for the [`UpstreamApi`] port.

use super::executor::RequestExecutor;
use super::pagination::PageWalker;
use async_trait::async_trait;
use bbmcp_application::ports::upstream_api::UpstreamApi;
use bbmcp_domain::{GatewayConfig, GatewayError, RequestOptions};
use serde_json::Value;

/// [`UpstreamApi`] implementation over [`RequestExecutor`].
#[derive(Clone)]
pub struct BitbucketClient {
    executor: RequestExecutor,
}

impl BitbucketClient {
    pub fn new() -> Result<Self, GatewayError> {
        Ok(Self::with_executor(RequestExecutor::new()?))
    }

    pub fn with_executor(executor: RequestExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl UpstreamApi for BitbucketClient {
    async fn get_json(
        &self,
        config: &GatewayConfig,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.executor.execute_json(config, url, options).await
    }

    async fn get_text(
        &self,
        config: &GatewayConfig,
        url: &str,
        options: RequestOptions,
    ) -> Result<String, GatewayError> {
        self.executor.execute_text(config, url, options).await
    }

    async fn get_all_pages(
        &self,
        config: &GatewayConfig,
        url: &str,
    ) -> Result<Vec<Value>, GatewayError> {
        PageWalker::new(&self.executor)
            .fetch_all_pages(config, url)
            .await
    }
}
