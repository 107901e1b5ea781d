//! Tool domain module
//!
//! Defines how the gateway's read-only operations are described, invoked
//! and reported.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (registry)   │    │ (invocation) │    │ (output)     │
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │
//!        ├─ aliases: "get_pr" → "bb_get_pull_request"
//!        └─ tools:   "bb_get_pull_request" → ToolDefinition
//! ```
//!
//! # Key Types
//!
//! - [`ToolSpec`]: Registry of available tools + alias mappings
//! - [`ToolDefinition`]: Schema for a single tool (name, params, category)
//! - [`ToolCall`]: An invocation with loosely-typed JSON arguments
//! - [`ToolResult`]: Text output, raw payload, or a [`ToolError`]
//! - [`ToolValidator`]: Pure argument validation against a definition

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{ToolCall, ToolCategory, ToolDefinition, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult, ToolResultMetadata};
