//! Tool handlers: one async function per read-only Bitbucket operation.
//!
//! Handlers are thin: they read arguments from the [`ToolCall`], build one
//! URL with [`HandlerContext::url`], call the [`UpstreamApi`] port, and
//! format the payload into text. Retry, timeouts and error classification
//! all live behind the port.
//!
//! | Module | Tools |
//! |--------|-------|
//! | [`account`] | `bb_get_current_user`, `bb_list_workspaces`, `bb_get_workspace` |
//! | [`repositories`] | repositories, branches, commits, file content |
//! | [`pull_requests`] | pull requests, diff, comments, commits |
//! | [`issues`] | `bb_list_issues` |
//! | [`pipelines`] | `bb_get_pipeline_step_log` |

pub mod account;
pub mod format;
pub mod issues;
pub mod pipelines;
pub mod pull_requests;
pub mod repositories;

use crate::ports::upstream_api::UpstreamApi;
use bbmcp_domain::{
    GatewayConfig, GatewayError, Page, RequestOptions, ToolCall, ToolDefinition, ToolParameter,
    ToolSpec,
};
use thiserror::Error;
use url::Url;

/// Argument controlling text vs JSON rendering, accepted by every tool.
pub const OUTPUT_FORMAT_PARAM: &str = "output_format";
/// JSON Pointer applied to the payload before JSON rendering.
pub const FILTER_PARAM: &str = "filter";

/// Upper bound for the upstream `pagelen` query parameter.
pub const MAX_PAGELEN: i64 = 100;

/// Errors a handler can produce.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl HandlerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        HandlerError::InvalidArgument(message.into())
    }
}

/// What a handler hands back: a readable rendering plus the payload it came from.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub text: String,
    pub data: serde_json::Value,
    pub item_count: Option<usize>,
}

impl ToolOutput {
    pub fn new(text: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            text: text.into(),
            data,
            item_count: None,
        }
    }

    pub fn with_item_count(mut self, count: usize) -> Self {
        self.item_count = Some(count);
        self
    }

    /// Output for a listing page; `data` is the page record itself.
    pub fn from_page(text: impl Into<String>, page: &Page<serde_json::Value>) -> Self {
        // Serializing a page of `Value`s cannot fail.
        let data = serde_json::to_value(page).unwrap_or_default();
        Self::new(text, data).with_item_count(page.values.len())
    }

    /// Output for a fully-walked listing.
    pub fn from_items(text: impl Into<String>, items: Vec<serde_json::Value>) -> Self {
        let count = items.len();
        Self::new(text, serde_json::Value::Array(items)).with_item_count(count)
    }
}

/// Everything a handler needs for one call.
pub struct HandlerContext<'a> {
    pub api: &'a dyn UpstreamApi,
    pub config: &'a GatewayConfig,
}

impl<'a> HandlerContext<'a> {
    pub fn new(api: &'a dyn UpstreamApi, config: &'a GatewayConfig) -> Self {
        Self { api, config }
    }

    /// Build an absolute API URL from raw path segments and query pairs.
    ///
    /// Each segment is percent-encoded, so slugs and refs containing `/`,
    /// spaces or `#` can't escape their position in the path.
    pub fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<String, HandlerError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.to_string())
    }

    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, HandlerError> {
        Ok(self.api.get_json(self.config, url, RequestOptions::new()).await?)
    }

    pub async fn get_text(&self, url: &str) -> Result<String, HandlerError> {
        Ok(self.api.get_text(self.config, url, RequestOptions::new()).await?)
    }

    /// Fetch a single listing page.
    pub async fn get_page(&self, url: &str) -> Result<Page<serde_json::Value>, HandlerError> {
        let value = self.get_json(url).await?;
        serde_json::from_value(value).map_err(|e| {
            HandlerError::Gateway(GatewayError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }

    pub async fn get_all_pages(&self, url: &str) -> Result<Vec<serde_json::Value>, HandlerError> {
        Ok(self.api.get_all_pages(self.config, url).await?)
    }
}

// ==================== Shared parameters ====================

pub(crate) fn workspace_param() -> ToolParameter {
    ToolParameter::new("workspace", "Workspace slug or UUID (e.g. \"acme\")", true)
}

pub(crate) fn repo_slug_param() -> ToolParameter {
    ToolParameter::new("repo_slug", "Repository slug (e.g. \"widgets\")", true)
}

pub(crate) fn pull_request_id_param() -> ToolParameter {
    ToolParameter::new("pull_request_id", "Numeric pull request ID", true).with_type("integer")
}

/// Adds `output_format` and `filter` to a definition.
pub(crate) fn with_output_params(definition: ToolDefinition) -> ToolDefinition {
    definition
        .with_parameter(
            ToolParameter::new(
                OUTPUT_FORMAT_PARAM,
                "Result rendering: \"text\" (default) or \"json\"",
                false,
            )
            .with_allowed_values(["text", "json"]),
        )
        .with_parameter(ToolParameter::new(
            FILTER_PARAM,
            "JSON Pointer selecting part of the JSON result (e.g. \"/values/0/name\"); implies JSON output",
            false,
        ))
}

/// Adds `page` and `pagelen` to a listing definition.
pub(crate) fn with_paging_params(definition: ToolDefinition) -> ToolDefinition {
    definition
        .with_parameter(
            ToolParameter::new("page", "Page number to fetch (starts at 1)", false)
                .with_type("integer"),
        )
        .with_parameter(
            ToolParameter::new("pagelen", "Items per page (1-100)", false).with_type("integer"),
        )
}

/// Reads `page`/`pagelen` into query pairs, validating ranges.
pub(crate) fn paging_query(call: &ToolCall) -> Result<Vec<(&'static str, String)>, HandlerError> {
    let mut query = Vec::new();
    if let Some(page) = call.optional_i64("page").map_err(HandlerError::invalid)? {
        if page < 1 {
            return Err(HandlerError::invalid("Argument 'page' must be at least 1"));
        }
        query.push(("page", page.to_string()));
    }
    if let Some(pagelen) = call.optional_i64("pagelen").map_err(HandlerError::invalid)? {
        if !(1..=MAX_PAGELEN).contains(&pagelen) {
            return Err(HandlerError::invalid(format!(
                "Argument 'pagelen' must be between 1 and {}",
                MAX_PAGELEN
            )));
        }
        query.push(("pagelen", pagelen.to_string()));
    }
    Ok(query)
}

pub(crate) fn require_str<'c>(call: &'c ToolCall, key: &str) -> Result<&'c str, HandlerError> {
    call.require_string(key).map_err(HandlerError::invalid)
}

pub(crate) fn require_positive(call: &ToolCall, key: &str) -> Result<i64, HandlerError> {
    match call.optional_i64(key).map_err(HandlerError::invalid)? {
        Some(value) if value >= 1 => Ok(value),
        Some(_) => Err(HandlerError::invalid(format!(
            "Argument '{}' must be a positive integer",
            key
        ))),
        None => Err(HandlerError::invalid(format!(
            "Missing required argument: {}",
            key
        ))),
    }
}

// ==================== Registry & dispatch ====================

/// All tool definitions with aliases.
pub fn default_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register_all(account::definitions())
        .register_all(repositories::definitions())
        .register_all(pull_requests::definitions())
        .register_all(issues::definitions())
        .register_all(pipelines::definitions())
        .register_aliases([
            ("whoami", account::GET_CURRENT_USER),
            ("list_repos", repositories::LIST_REPOSITORIES),
            ("get_repo", repositories::GET_REPOSITORY),
            ("get_file", repositories::GET_FILE_CONTENT),
            ("list_prs", pull_requests::LIST_PULL_REQUESTS),
            ("get_pr", pull_requests::GET_PULL_REQUEST),
            ("get_pr_diff", pull_requests::GET_PULL_REQUEST_DIFF),
        ])
}

/// Route a call (canonical name) to its handler.
pub async fn dispatch(
    name: &str,
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    match name {
        account::GET_CURRENT_USER => account::get_current_user(ctx, call).await,
        account::LIST_WORKSPACES => account::list_workspaces(ctx, call).await,
        account::GET_WORKSPACE => account::get_workspace(ctx, call).await,
        repositories::LIST_REPOSITORIES => repositories::list_repositories(ctx, call).await,
        repositories::GET_REPOSITORY => repositories::get_repository(ctx, call).await,
        repositories::LIST_BRANCHES => repositories::list_branches(ctx, call).await,
        repositories::LIST_COMMITS => repositories::list_commits(ctx, call).await,
        repositories::GET_COMMIT => repositories::get_commit(ctx, call).await,
        repositories::GET_FILE_CONTENT => repositories::get_file_content(ctx, call).await,
        pull_requests::LIST_PULL_REQUESTS => pull_requests::list_pull_requests(ctx, call).await,
        pull_requests::GET_PULL_REQUEST => pull_requests::get_pull_request(ctx, call).await,
        pull_requests::GET_PULL_REQUEST_DIFF => {
            pull_requests::get_pull_request_diff(ctx, call).await
        }
        pull_requests::LIST_PULL_REQUEST_COMMENTS => {
            pull_requests::list_pull_request_comments(ctx, call).await
        }
        pull_requests::LIST_PULL_REQUEST_COMMITS => {
            pull_requests::list_pull_request_commits(ctx, call).await
        }
        issues::LIST_ISSUES => issues::list_issues(ctx, call).await,
        pipelines::GET_PIPELINE_STEP_LOG => pipelines::get_pipeline_step_log(ctx, call).await,
        other => Err(HandlerError::invalid(format!("No handler for tool '{}'", other))),
    }
}
