//! Application layer for bitbucket-mcp
//!
//! This crate contains the tool handlers, the invoke-tool use case and the
//! port definitions the infrastructure layer implements.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    config_source::{ConfigError, ConfigSource, StaticConfigSource},
    tool_executor::ToolExecutorPort,
    tool_schema::ToolSchemaPort,
    upstream_api::UpstreamApi,
};
pub use use_cases::handlers::{
    FILTER_PARAM, HandlerError, OUTPUT_FORMAT_PARAM, ToolOutput, default_tool_spec,
};
pub use use_cases::invoke_tool::InvokeToolUseCase;
