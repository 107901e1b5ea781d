//! MCP stdio server.
//!
//! Reads one JSON-RPC message per line, answers requests in arrival order and
//! writes each response as a single line followed by a flush. Notifications
//! are consumed silently. The loop ends on EOF or when the shutdown token is
//! cancelled.

use super::protocol::{
    CallToolResult, DEFAULT_PROTOCOL_VERSION, IncomingMessage, InitializeParams, JsonRpcResponse,
    MessageKind, ProtocolError, ToolCallParams,
};
use crate::output::renderer::ResultRenderer;
use bbmcp_application::{ConfigSource, ToolExecutorPort, ToolSchemaPort};
use bbmcp_domain::{OutputFormat, ToolCall};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

pub const SERVER_NAME: &str = "bitbucket-mcp";

pub struct McpServer {
    executor: Arc<dyn ToolExecutorPort>,
    schema: Arc<dyn ToolSchemaPort>,
    config: Arc<dyn ConfigSource>,
}

impl McpServer {
    pub fn new(
        executor: Arc<dyn ToolExecutorPort>,
        schema: Arc<dyn ToolSchemaPort>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        Self {
            executor,
            schema,
            config,
        }
    }

    /// Serve until EOF on `reader` or cancellation of `shutdown`.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        mut writer: W,
        shutdown: CancellationToken,
    ) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        info!(
            tools = self.executor.tool_spec().len(),
            "MCP server ready on stdio"
        );

        loop {
            buf.clear();
            let bytes_read = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested; stopping MCP server");
                    break;
                }
                read = reader.read_until(b'\n', &mut buf) => read?,
            };
            if bytes_read == 0 {
                info!("Input closed; stopping MCP server");
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            trace!("Received: {}", line);

            if let Some(response) = self.handle_line(line).await {
                let mut json = serde_json::to_string(&response).map_err(io::Error::other)?;
                trace!("Sending: {}", json);
                json.push('\n');
                writer.write_all(json.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one raw line. `None` means no response is owed (notification).
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse JSON-RPC message: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ProtocolError::Parse(e.to_string()),
                ));
            }
        };
        if value.is_array() {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                ProtocolError::InvalidRequest("batch requests are not supported".into()),
            ));
        }

        let message: IncomingMessage = match serde_json::from_value(value) {
            Ok(message) => message,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ProtocolError::InvalidRequest(e.to_string()),
                ));
            }
        };

        match message.classify() {
            MessageKind::Request { id, method } => {
                debug!(%method, %id, "Handling request");
                let response = match self.handle_request(&method, message.params).await {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => {
                        debug!(%method, code = e.code(), "Request failed: {}", e);
                        JsonRpcResponse::failure(id, e)
                    }
                };
                Some(response)
            }
            MessageKind::Notification { method } => {
                match method.as_str() {
                    "notifications/initialized" => info!("Client initialized"),
                    other => debug!(method = other, "Ignoring notification"),
                }
                None
            }
            MessageKind::Invalid { id, reason } => Some(JsonRpcResponse::failure(
                id,
                ProtocolError::InvalidRequest(reason),
            )),
        }
    }

    async fn handle_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, ProtocolError> {
        match method {
            "initialize" => Ok(self.initialize(optional_params(params)?)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({
                "tools": self.schema.all_tools_schema(self.executor.tool_spec())
            })),
            "tools/call" => self.call_tool(required_params(params)?).await,
            other => Err(ProtocolError::MethodNotFound(other.to_string())),
        }
    }

    fn initialize(&self, params: InitializeParams) -> Value {
        if let Some(client) = &params.client_info {
            info!(
                client = %client.name,
                version = client.version.as_deref().unwrap_or("unknown"),
                "Client connected"
            );
        }
        let protocol_version = params
            .protocol_version
            .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string());
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, params: ToolCallParams) -> Result<Value, ProtocolError> {
        let arguments = match params.arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(object @ Value::Object(_)) => object,
            Some(_) => {
                return Err(ProtocolError::InvalidParams(
                    "arguments must be an object".into(),
                ));
            }
        };
        if !self.executor.has_tool(&params.name) {
            return Err(ProtocolError::InvalidParams(format!(
                "Unknown tool: {}",
                params.name
            )));
        }

        let call = ToolCall::from_json(&params.name, &arguments);
        let result = self.executor.execute(&call).await;
        let rendered = ResultRenderer::new(self.default_format()).render(&result, &call);

        serde_json::to_value(CallToolResult::text(rendered.text, rendered.is_error))
            .map_err(|e| ProtocolError::Internal(e.to_string()))
    }

    /// Configured default output format. A config failure here falls back to
    /// text; the tool call itself reports the failure.
    fn default_format(&self) -> OutputFormat {
        match self.config.load() {
            Ok(config) => config.default_output,
            Err(e) => {
                debug!("Using text output; configuration unavailable: {}", e);
                OutputFormat::default()
            }
        }
    }
}

fn optional_params<T: DeserializeOwned + Default>(params: Option<Value>) -> Result<T, ProtocolError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => {
            serde_json::from_value(value).map_err(|e| ProtocolError::InvalidParams(e.to_string()))
        }
    }
}

fn required_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, ProtocolError> {
    match params {
        None | Some(Value::Null) => Err(ProtocolError::InvalidParams("missing params".into())),
        Some(value) => {
            serde_json::from_value(value).map_err(|e| ProtocolError::InvalidParams(e.to_string()))
        }
    }
}
