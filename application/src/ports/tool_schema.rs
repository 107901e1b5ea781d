//! Tool schema conversion port.
//!
//! Separates "which tools exist" (domain) from "how to describe them on the
//! wire" (infrastructure). The MCP `tools/list` response is built from this.

use bbmcp_domain::tool::entities::{ToolDefinition, ToolSpec};

/// Port for converting tool definitions to JSON Schema.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition to an MCP tool descriptor
    /// (`name`, `description`, `inputSchema`).
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert all tools to descriptors (sorted by name).
    fn all_tools_schema(&self, spec: &ToolSpec) -> Vec<serde_json::Value>;
}
