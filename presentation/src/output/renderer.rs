//! Tool result renderer.
//!
//! Picks the output format for one call (explicit `output_format` argument,
//! then `filter`, then the configured default) and produces the text the
//! caller sees. A `filter` is a JSON Pointer into the result payload and
//! always yields JSON.

use bbmcp_application::{FILTER_PARAM, OUTPUT_FORMAT_PARAM};
use bbmcp_domain::{OutputFormat, ToolCall, ToolResult};
use serde_json::Value;

/// Final text for one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub is_error: bool,
}

impl Rendered {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRenderer {
    default_format: OutputFormat,
}

impl ResultRenderer {
    pub fn new(default_format: OutputFormat) -> Self {
        Self { default_format }
    }

    /// Render using the call's own `output_format` / `filter` arguments.
    pub fn render(&self, result: &ToolResult, call: &ToolCall) -> Rendered {
        let format = call
            .get_string(OUTPUT_FORMAT_PARAM)
            .and_then(|s| s.parse::<OutputFormat>().ok());
        let filter = call.get_string(FILTER_PARAM);
        self.render_with(result, format, filter)
    }

    pub fn render_with(
        &self,
        result: &ToolResult,
        format: Option<OutputFormat>,
        filter: Option<&str>,
    ) -> Rendered {
        if let Some(error) = result.error() {
            return Rendered::error(error.message.clone());
        }

        let filter = filter.map(str::trim).filter(|f| !f.is_empty());
        let format = match (format, filter) {
            (_, Some(_)) => OutputFormat::Json,
            (Some(format), None) => format,
            (None, None) => self.default_format,
        };

        match format {
            OutputFormat::Text => Rendered::ok(result.output().unwrap_or_default()),
            OutputFormat::Json => {
                let payload = match &result.data {
                    Some(data) => data.clone(),
                    None => Value::String(result.output().unwrap_or_default().to_string()),
                };
                let selected = match filter {
                    Some(pointer) => match payload.pointer(pointer) {
                        Some(value) => value,
                        None => {
                            return Rendered::error(format!(
                                "Filter '{}' matched nothing in the result of {} \
                                 (filters are JSON Pointers such as '/values/0/title')",
                                pointer, result.tool_name
                            ));
                        }
                    },
                    None => &payload,
                };
                match serde_json::to_string_pretty(selected) {
                    Ok(text) => Rendered::ok(text),
                    Err(e) => Rendered::error(format!("Failed to encode result as JSON: {e}")),
                }
            }
        }
    }
}
