//! Domain layer for bitbucket-mcp
//!
//! This crate contains the pure types of the gateway: the upstream error
//! taxonomy, the request model, the configuration record and the tool
//! entities. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Read-only contract
//!
//! Only [`READ_METHOD`] may ever leave the gateway. The request model keeps
//! a caller-supplied method solely so the executor can reject it loudly.
//!
//! ## Error taxonomy
//!
//! Upstream failures are classified by [`classify_failure`] into a closed
//! set of [`UpstreamErrorKind`]s whose messages are self-contained, so the
//! tool boundary can surface them verbatim.

pub mod config;
pub mod core;
pub mod request;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::{Credential, GatewayConfig, OutputFormat};
pub use core::{
    error::{ErrorBody, GatewayError, UpstreamError, UpstreamErrorKind, classify_failure},
    resource::{ResourceKind, infer_resource_kind},
};
pub use request::{Page, READ_METHOD, RequestOptions, ResponseShape};
pub use tool::{
    entities::{ToolCall, ToolCategory, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
