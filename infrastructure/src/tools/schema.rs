//! JSON Schema tool converter.
//!
//! Default implementation of [`ToolSchemaPort`] producing MCP tool
//! descriptors (`name`, `description`, `inputSchema`).

use bbmcp_application::ports::tool_schema::ToolSchemaPort;
use bbmcp_domain::tool::entities::{ToolDefinition, ToolSpec};

/// Default implementation producing MCP-compatible JSON Schema.
///
/// Handles param_type → JSON Schema type mapping:
/// - `"string"` → `"string"`
/// - `"number"` → `"number"`
/// - `"integer"` → `"integer"`
/// - `"boolean"` → `"boolean"`
/// - anything else → `"string"`
///
/// Parameters with `allowed_values` get an `enum`.
pub struct JsonSchemaToolConverter;

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let schema_type = match param.param_type.as_str() {
                "string" => "string",
                "number" => "number",
                "integer" => "integer",
                "boolean" => "boolean",
                _ => "string",
            };

            let mut prop = serde_json::Map::new();
            prop.insert("type".to_string(), serde_json::json!(schema_type));
            prop.insert(
                "description".to_string(),
                serde_json::json!(param.description),
            );
            if !param.allowed_values.is_empty() {
                prop.insert("enum".to_string(), serde_json::json!(param.allowed_values));
            }
            if schema_type == "integer" {
                prop.insert("minimum".to_string(), serde_json::json!(1));
            }
            properties.insert(param.name.clone(), serde_json::Value::Object(prop));

            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "name": tool.name,
            "description": tool.description,
            "inputSchema": {
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            }
        })
    }

    fn all_tools_schema(&self, spec: &ToolSpec) -> Vec<serde_json::Value> {
        spec.sorted()
            .into_iter()
            .map(|t| self.tool_to_schema(t))
            .collect()
    }
}
