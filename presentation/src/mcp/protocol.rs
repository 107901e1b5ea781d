//! JSON-RPC protocol types for the MCP stdio server.
//!
//! # Protocol Overview
//!
//! - **Requests**: client → server, carry an `id` and expect exactly one response
//! - **Notifications**: client → server, no `id`, never answered
//! - **Responses**: server → client, either `result` or `error`
//!
//! Messages are single-line JSON documents separated by `\n`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// MCP revision answered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Standard JSON-RPC error codes
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Failures that become JSON-RPC error responses
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    pub fn code(&self) -> i64 {
        match self {
            ProtocolError::Parse(_) => codes::PARSE_ERROR,
            ProtocolError::InvalidRequest(_) => codes::INVALID_REQUEST,
            ProtocolError::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            ProtocolError::InvalidParams(_) => codes::INVALID_PARAMS,
            ProtocolError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}

impl From<ProtocolError> for RpcError {
    fn from(error: ProtocolError) -> Self {
        RpcError {
            code: error.code(),
            message: error.to_string(),
            data: None,
        }
    }
}

/// Inbound message before it is classified.
///
/// Every field is optional so malformed envelopes can still be answered
/// with `-32600` instead of failing to deserialize.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Classification of an inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    /// Has `id` and `method`
    Request { id: Value, method: String },
    /// Has `method` but no `id`
    Notification { method: String },
    /// Anything else; answered with `-32600` when an id can be recovered
    Invalid { id: Value, reason: String },
}

impl IncomingMessage {
    pub fn classify(&self) -> MessageKind {
        let id = self.id.clone().filter(|id| !id.is_null());
        if self.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
            return MessageKind::Invalid {
                id: id.unwrap_or(Value::Null),
                reason: "jsonrpc must be \"2.0\"".into(),
            };
        }
        if let Some(id) = &id
            && !(id.is_string() || id.is_number())
        {
            return MessageKind::Invalid {
                id: Value::Null,
                reason: "id must be a string or a number".into(),
            };
        }
        match (id, self.method.clone()) {
            (Some(id), Some(method)) => MessageKind::Request { id, method },
            (None, Some(method)) => MessageKind::Notification { method },
            (id, None) => MessageKind::Invalid {
                id: id.unwrap_or(Value::Null),
                reason: "missing method".into(),
            },
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: impl Into<RpcError>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// `initialize` parameters (only the fields the server reads)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// `tools/call` parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// One content block of a tool result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// `tools/call` result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<TextContent>,
    pub is_error: bool,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content: vec![TextContent {
                content_type: "text".to_string(),
                text: text.into(),
            }],
            is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn incoming(value: Value) -> IncomingMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_request_and_notification() {
        let request = incoming(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}));
        assert_eq!(
            request.classify(),
            MessageKind::Request {
                id: json!(1),
                method: "ping".into()
            }
        );

        let note = incoming(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}));
        assert_eq!(
            note.classify(),
            MessageKind::Notification {
                method: "notifications/initialized".into()
            }
        );
    }

    #[test]
    fn test_classify_invalid_envelopes() {
        let wrong_version = incoming(json!({"jsonrpc": "1.0", "id": "a", "method": "ping"}));
        assert!(matches!(
            wrong_version.classify(),
            MessageKind::Invalid { id, .. } if id == json!("a")
        ));

        let no_method = incoming(json!({"jsonrpc": "2.0", "id": 4}));
        assert!(matches!(no_method.classify(), MessageKind::Invalid { id, .. } if id == json!(4)));

        let object_id = incoming(json!({"jsonrpc": "2.0", "id": {}, "method": "ping"}));
        assert!(matches!(
            object_id.classify(),
            MessageKind::Invalid { id: Value::Null, .. }
        ));
    }

    #[test]
    fn test_response_serialization_omits_absent_fields() {
        let ok = JsonRpcResponse::success(json!(1), json!({}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"jsonrpc": "2.0", "id": 1, "result": {}})
        );

        let err = JsonRpcResponse::failure(json!("x"), ProtocolError::MethodNotFound("foo".into()));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"jsonrpc": "2.0", "id": "x", "error": {"code": -32601, "message": "Method not found: foo"}})
        );
    }

    #[test]
    fn test_call_tool_result_shape() {
        let result = CallToolResult::text("hello", true);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"content": [{"type": "text", "text": "hello"}], "isError": true})
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ProtocolError::Parse(String::new()).code(), -32700);
        assert_eq!(ProtocolError::InvalidRequest(String::new()).code(), -32600);
        assert_eq!(ProtocolError::InvalidParams(String::new()).code(), -32602);
    }
}
