//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which part of the upstream API a tool reads from.
///
/// Every tool is read-only; the category only groups the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Account,
    Workspace,
    Repository,
    Source,
    PullRequest,
    Issue,
    Pipeline,
}

impl ToolCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ToolCategory::Account => "account",
            ToolCategory::Workspace => "workspace",
            ToolCategory::Repository => "repository",
            ToolCategory::Source => "source",
            ToolCategory::PullRequest => "pull_request",
            ToolCategory::Issue => "issue",
            ToolCategory::Pipeline => "pipeline",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a tool exposed to the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "bb_get_repository")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// API area this tool reads from
    pub category: ToolCategory,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "integer", "boolean")
    pub param_type: String,
    /// Allowed values, if the parameter is an enumeration
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_parameters(mut self, params: impl IntoIterator<Item = ToolParameter>) -> Self {
        self.parameters.extend(params);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
            allowed_values: Vec::new(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn with_allowed_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Registry of available tools
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: HashMap<String, ToolDefinition>,
    /// Alias → canonical name mapping (e.g. "get_pr" → "bb_get_pull_request")
    aliases: HashMap<String, String>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn register_all(mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        for tool in tools {
            self.tools.insert(tool.name.clone(), tool);
        }
        self
    }

    /// Register a single alias mapping (builder pattern)
    pub fn register_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    /// Register multiple aliases at once (builder pattern)
    pub fn register_aliases(
        mut self,
        mappings: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        for (alias, canonical) in mappings {
            self.aliases.insert(alias.into(), canonical.into());
        }
        self
    }

    /// Resolve an alias to its canonical name (aliases only, not canonical names)
    pub fn resolve_alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|s| s.as_str())
    }

    /// Resolve a name: returns canonical name if it's a registered tool,
    /// or resolves alias, or None if unknown
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.tools.contains_key(name) {
            Some(name)
        } else {
            self.resolve_alias(name)
        }
    }

    /// Get tool definition by canonical name or alias
    pub fn get_resolved(&self, name: &str) -> Option<&ToolDefinition> {
        self.resolve(name).and_then(|canonical| self.tools.get(canonical))
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// All tools sorted by name, for stable catalog output
    pub fn sorted(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<&ToolDefinition> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A call to a tool with loosely-typed arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    /// Build a call from a JSON object of arguments; `null` and non-objects
    /// yield an empty argument map.
    pub fn from_json(tool_name: impl Into<String>, arguments: &serde_json::Value) -> Self {
        let arguments = arguments
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required, non-blank string argument or return an error message
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        match self.arguments.get(key) {
            None | Some(serde_json::Value::Null) => {
                Err(format!("Missing required argument: {}", key))
            }
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
                Err(format!("Argument '{}' must not be empty", key))
            }
            Some(serde_json::Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(format!("Argument '{}' must be a string", key)),
        }
    }

    /// Get an optional i64 argument. Numeric strings are accepted since
    /// callers frequently quote numbers.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Like [`get_i64`](Self::get_i64) but distinguishes "absent" from "not an integer".
    pub fn optional_i64(&self, key: &str) -> Result<Option<i64>, String> {
        match self.arguments.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(_) => self
                .get_i64(key)
                .map(Some)
                .ok_or_else(|| format!("Argument '{}' must be an integer", key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("bb_get_repository", "Get a repository", ToolCategory::Repository)
            .with_parameter(ToolParameter::new("workspace", "Workspace slug", true))
            .with_parameter(
                ToolParameter::new("state", "PR state", false).with_allowed_values(["OPEN", "MERGED"]),
            );

        assert_eq!(tool.name, "bb_get_repository");
        assert_eq!(tool.parameters.len(), 2);
        assert_eq!(tool.parameter("state").unwrap().allowed_values.len(), 2);
        assert!(tool.parameter("missing").is_none());
    }

    #[test]
    fn test_tool_spec() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("bb_get_repository", "Repo", ToolCategory::Repository))
            .register(ToolDefinition::new("bb_get_pull_request", "PR", ToolCategory::PullRequest));

        assert!(spec.get("bb_get_repository").is_some());
        assert!(spec.get("unknown").is_none());
        assert_eq!(spec.len(), 2);
        let sorted: Vec<_> = spec.sorted().iter().map(|t| t.name.clone()).collect();
        assert_eq!(sorted, vec!["bb_get_pull_request", "bb_get_repository"]);
    }

    #[test]
    fn test_tool_spec_aliases() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new("bb_get_pull_request", "PR", ToolCategory::PullRequest))
            .register_aliases([("get_pr", "bb_get_pull_request"), ("pr", "bb_get_pull_request")]);

        assert_eq!(spec.resolve_alias("get_pr"), Some("bb_get_pull_request"));
        assert_eq!(spec.resolve_alias("bb_get_pull_request"), None);
        assert_eq!(spec.resolve("pr"), Some("bb_get_pull_request"));
        assert_eq!(spec.resolve("unknown"), None);
        assert_eq!(spec.get_resolved("get_pr").unwrap().name, "bb_get_pull_request");
        // get() is exact match only
        assert!(spec.get("get_pr").is_none());
    }

    #[test]
    fn test_tool_call_from_json() {
        let call = ToolCall::from_json(
            "bb_get_pull_request",
            &serde_json::json!({"workspace": "acme", "pull_request_id": "42"}),
        );
        assert_eq!(call.get_string("workspace"), Some("acme"));
        assert_eq!(call.get_i64("pull_request_id"), Some(42));

        let empty = ToolCall::from_json("bb_get_current_user", &serde_json::Value::Null);
        assert!(empty.arguments.is_empty());
    }

    #[test]
    fn test_require_string() {
        let call = ToolCall::new("t")
            .with_arg("ok", "value")
            .with_arg("blank", "  ")
            .with_arg("number", 3);
        assert_eq!(call.require_string("ok").unwrap(), "value");
        assert!(call.require_string("blank").unwrap_err().contains("must not be empty"));
        assert!(call.require_string("number").unwrap_err().contains("must be a string"));
        assert!(call.require_string("missing").unwrap_err().contains("Missing required"));
    }

    #[test]
    fn test_optional_i64() {
        let call = ToolCall::new("t").with_arg("page", 2).with_arg("bad", "two");
        assert_eq!(call.optional_i64("page").unwrap(), Some(2));
        assert_eq!(call.optional_i64("absent").unwrap(), None);
        assert!(call.optional_i64("bad").is_err());
    }
}
