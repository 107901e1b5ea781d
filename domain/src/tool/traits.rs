//! Tool domain traits
//!
//! Contains pure domain logic traits for tool validation.
//! Tool execution itself is an application-layer use case.

use super::entities::{ToolCall, ToolDefinition};

/// Validator for tool calls
///
/// This is a pure domain trait that validates tool calls
/// against their definitions without any I/O operations.
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String>;
}

/// Default implementation of ToolValidator
///
/// Checks presence of required parameters, rejects unknown ones, and
/// enforces `allowed_values` for string arguments. Type and range checks
/// beyond that belong to the individual handlers.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String> {
        // Check that all required parameters are present
        for param in &definition.parameters {
            let present = call
                .arguments
                .get(&param.name)
                .is_some_and(|v| !v.is_null());
            if param.required && !present {
                return Err(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    param.name, definition.name
                ));
            }
        }

        for (arg_name, value) in &call.arguments {
            let Some(param) = definition.parameter(arg_name) else {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                ));
            };

            if let Some(s) = value.as_str()
                && !param.allowed_values.is_empty()
                && !param.allowed_values.iter().any(|v| v.eq_ignore_ascii_case(s))
            {
                return Err(format!(
                    "Invalid value '{}' for parameter '{}' (expected one of: {})",
                    s,
                    param.name,
                    param.allowed_values.join(", ")
                ));
            }
        }

        Ok(())
    }
}
