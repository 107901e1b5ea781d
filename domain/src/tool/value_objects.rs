//! Tool domain value objects: immutable result and error types
//!
//! Every tool invocation produces a [`ToolResult`]. Failures never escape
//! as Rust errors past the tool boundary; they are carried in
//! [`ToolResult::error`] with a self-contained message.

use serde::{Deserialize, Serialize};

/// Error that occurred during tool execution.
///
/// | Code | Meaning |
/// |------|---------|
/// | `INVALID_ARGUMENT` | Missing or malformed arguments |
/// | `NOT_FOUND` | Unknown tool name |
/// | `UPSTREAM_ERROR` | Classified upstream HTTP failure |
/// | `TIMEOUT` | Upstream did not answer in time |
/// | `CONFIG_ERROR` | Configuration could not be resolved |
/// | `EXECUTION_FAILED` | Anything else (network, decoding) |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "UPSTREAM_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_ERROR", message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new("CONFIG_ERROR", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new("TIMEOUT", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution, carrying output or error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Text rendering of the result (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Raw upstream payload backing the text, used for JSON rendering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Metadata about the execution
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about tool execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Number of bytes returned (text endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// Number of items returned (listing endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            data: None,
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            data: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Attach the raw payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add metadata to the result
    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add duration metadata
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get the output content
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Get the error
    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error() {
        let err = ToolError::not_found("bb_unknown").with_details("Unknown tool");

        assert_eq!(err.code, "NOT_FOUND");
        assert!(err.message.contains("bb_unknown"));
        assert_eq!(err.to_string(), "[NOT_FOUND] Resource not found: bb_unknown (Unknown tool)");
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("bb_get_repository", "acme/widgets")
            .with_data(serde_json::json!({"slug": "widgets"}))
            .with_duration(12);

        assert!(result.is_success());
        assert_eq!(result.output(), Some("acme/widgets"));
        assert!(result.error().is_none());
        assert_eq!(result.metadata.duration_ms, Some(12));
        assert_eq!(result.data.unwrap()["slug"], "widgets");
    }

    #[test]
    fn test_tool_result_failure() {
        let result = ToolResult::failure("bb_get_repository", ToolError::upstream("boom"));

        assert!(!result.is_success());
        assert!(result.output().is_none());
        assert_eq!(result.error().unwrap().code, "UPSTREAM_ERROR");
    }
}
