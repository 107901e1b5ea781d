//! Issue tracker tool.

use super::format::{date_at, listing, str_at};
use super::{
    HandlerContext, HandlerError, ToolOutput, paging_query, repo_slug_param, require_str,
    with_output_params, with_paging_params, workspace_param,
};
use bbmcp_domain::{ToolCall, ToolCategory, ToolDefinition, ToolParameter};

pub const LIST_ISSUES: &str = "bb_list_issues";

pub fn definitions() -> Vec<ToolDefinition> {
    vec![with_output_params(with_paging_params(
        ToolDefinition::new(
            LIST_ISSUES,
            "List issues of a repository that has the issue tracker enabled",
            ToolCategory::Issue,
        )
        .with_parameters([workspace_param(), repo_slug_param()])
        .with_parameter(ToolParameter::new(
            "query",
            "Bitbucket query language filter (e.g. state = \"open\")",
            false,
        )),
    ))]
}

pub async fn list_issues(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let mut query = paging_query(call)?;
    if let Some(q) = call.get_string("query").filter(|q| !q.trim().is_empty()) {
        query.push(("q", q.to_string()));
    }
    let url = ctx.url(&["repositories", workspace, repo_slug, "issues"], &query)?;
    let page = ctx.get_page(&url).await?;
    let text = listing(&format!("Issues in {workspace}/{repo_slug}:"), &page, |issue| {
        format!(
            "- #{} {} [{}, {}, {}] reported by {} ({})",
            issue.get("id").map(ToString::to_string).unwrap_or_default(),
            str_at(issue, "/title", "(untitled)"),
            str_at(issue, "/state", "?"),
            str_at(issue, "/kind", "?"),
            str_at(issue, "/priority", "?"),
            str_at(issue, "/reporter/display_name", "unknown"),
            date_at(issue, "/created_on")
        )
    });
    Ok(ToolOutput::from_page(text, &page))
}
