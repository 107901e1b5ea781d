//! Invoke Tool use case.
//!
//! The single entry point the transport layer uses to run a tool:
//!
//! 1. Resolve aliases against the [`ToolSpec`]
//! 2. Validate arguments with [`DefaultToolValidator`]
//! 3. Load a fresh [`GatewayConfig`] from the [`ConfigSource`]
//! 4. Dispatch to the handler
//! 5. Convert the outcome into a [`ToolResult`]
//!
//! No error crosses this boundary as a Rust error. Every failure becomes a
//! [`ToolResult::failure`] whose message already carries status, detail and
//! remediation hint, so callers can show it verbatim.

use crate::ports::config_source::ConfigSource;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::upstream_api::UpstreamApi;
use crate::use_cases::handlers::{self, HandlerContext, HandlerError, ToolOutput};
use async_trait::async_trait;
use bbmcp_domain::{
    DefaultToolValidator, GatewayError, ToolCall, ToolError, ToolResult, ToolResultMetadata,
    ToolSpec, ToolValidator,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Use case for running one tool call against the upstream API.
pub struct InvokeToolUseCase {
    api: Arc<dyn UpstreamApi>,
    config: Arc<dyn ConfigSource>,
    spec: ToolSpec,
    validator: DefaultToolValidator,
}

impl Clone for InvokeToolUseCase {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            config: self.config.clone(),
            spec: self.spec.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl InvokeToolUseCase {
    pub fn new(api: Arc<dyn UpstreamApi>, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            api,
            config,
            spec: handlers::default_tool_spec(),
            validator: DefaultToolValidator,
        }
    }

    async fn run(&self, canonical: &str, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let definition = self
            .spec
            .get(canonical)
            .ok_or_else(|| {
                ToolError::not_found(format!("tool '{}'", call.tool_name))
                    .with_details("call tools/list for the available tools")
            })?;
        self.validator
            .validate(call, definition)
            .map_err(ToolError::invalid_argument)?;

        let config = self
            .config
            .load()
            .map_err(|e| ToolError::config(e.to_string()))?;
        debug!(
            tool = canonical,
            base_url = %config.base_url,
            authenticated = config.is_authenticated(),
            "Dispatching tool call"
        );

        let ctx = HandlerContext::new(self.api.as_ref(), &config);
        handlers::dispatch(canonical, &ctx, call)
            .await
            .map_err(to_tool_error)
    }
}

/// Map a handler failure to the tool-boundary error, keeping the full message.
fn to_tool_error(error: HandlerError) -> ToolError {
    match error {
        HandlerError::InvalidArgument(message) => ToolError::invalid_argument(message),
        HandlerError::Gateway(e) => match &e {
            GatewayError::Upstream(upstream) => ToolError::upstream(upstream.user_message()),
            GatewayError::Timeout { .. } => ToolError::timeout(e.user_message()),
            GatewayError::MethodNotAllowed { .. } | GatewayError::InvalidUrl(_) => {
                ToolError::invalid_argument(e.user_message())
            }
            GatewayError::Network(_)
            | GatewayError::Decode { .. }
            | GatewayError::Exhausted { .. } => ToolError::execution_failed(e.user_message()),
        },
    }
}

#[async_trait]
impl ToolExecutorPort for InvokeToolUseCase {
    fn tool_spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let started = Instant::now();
        let canonical = self
            .spec
            .resolve(&call.tool_name)
            .unwrap_or(&call.tool_name)
            .to_string();

        let outcome = self.run(&canonical, call).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                info!(tool = %canonical, duration_ms, "Tool call succeeded");
                let metadata = ToolResultMetadata {
                    duration_ms: Some(duration_ms),
                    bytes: Some(output.text.len()),
                    item_count: output.item_count,
                };
                ToolResult::success(canonical, output.text)
                    .with_data(output.data)
                    .with_metadata(metadata)
            }
            Err(error) => {
                warn!(tool = %canonical, code = %error.code, duration_ms, "Tool call failed: {}", error.message);
                ToolResult::failure(canonical, error).with_duration(duration_ms)
            }
        }
    }
}
