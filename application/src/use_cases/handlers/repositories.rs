//! Repository, branch, commit and source tools.

use super::format::{clip_text, date_at, field_lines, listing, preview_at, short_hash, str_at};
use super::{
    HandlerContext, HandlerError, ToolOutput, paging_query, repo_slug_param, require_str,
    with_output_params, with_paging_params, workspace_param,
};
use bbmcp_domain::{ToolCall, ToolCategory, ToolDefinition, ToolParameter};
use serde_json::{Value, json};

pub const LIST_REPOSITORIES: &str = "bb_list_repositories";
pub const GET_REPOSITORY: &str = "bb_get_repository";
pub const LIST_BRANCHES: &str = "bb_list_branches";
pub const LIST_COMMITS: &str = "bb_list_commits";
pub const GET_COMMIT: &str = "bb_get_commit";
pub const GET_FILE_CONTENT: &str = "bb_get_file_content";

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        with_output_params(with_paging_params(
            ToolDefinition::new(
                LIST_REPOSITORIES,
                "List repositories in a workspace, optionally filtered with a Bitbucket query",
                ToolCategory::Repository,
            )
            .with_parameter(workspace_param())
            .with_parameter(ToolParameter::new(
                "query",
                "Bitbucket query language filter (e.g. name ~ \"api\")",
                false,
            )),
        )),
        with_output_params(
            ToolDefinition::new(
                GET_REPOSITORY,
                "Get details of a repository",
                ToolCategory::Repository,
            )
            .with_parameters([workspace_param(), repo_slug_param()]),
        ),
        with_output_params(with_paging_params(
            ToolDefinition::new(
                LIST_BRANCHES,
                "List branches of a repository",
                ToolCategory::Repository,
            )
            .with_parameters([workspace_param(), repo_slug_param()]),
        )),
        with_output_params(with_paging_params(
            ToolDefinition::new(
                LIST_COMMITS,
                "List commits of a repository, newest first",
                ToolCategory::Source,
            )
            .with_parameters([workspace_param(), repo_slug_param()])
            .with_parameter(ToolParameter::new(
                "branch",
                "Branch, tag or commit to start from (defaults to all branches)",
                false,
            )),
        )),
        with_output_params(
            ToolDefinition::new(GET_COMMIT, "Get a single commit", ToolCategory::Source)
                .with_parameters([workspace_param(), repo_slug_param()])
                .with_parameter(ToolParameter::new("commit", "Commit hash", true)),
        ),
        with_output_params(
            ToolDefinition::new(
                GET_FILE_CONTENT,
                "Read a file from a repository at a given ref",
                ToolCategory::Source,
            )
            .with_parameters([workspace_param(), repo_slug_param()])
            .with_parameter(ToolParameter::new(
                "path",
                "File path relative to the repository root",
                true,
            ))
            .with_parameter(ToolParameter::new(
                "ref",
                "Branch, tag or commit hash (defaults to the main branch)",
                false,
            )),
        ),
    ]
}

pub async fn list_repositories(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let mut query = paging_query(call)?;
    if let Some(q) = call.get_string("query").filter(|q| !q.trim().is_empty()) {
        query.push(("q", q.to_string()));
    }
    let url = ctx.url(&["repositories", workspace], &query)?;
    let page = ctx.get_page(&url).await?;
    let text = listing(&format!("Repositories in {workspace}:"), &page, |repo| {
        let visibility = match repo.pointer("/is_private").and_then(Value::as_bool) {
            Some(true) => "private",
            Some(false) => "public",
            None => "?",
        };
        let mut line = format!(
            "- {} [{}, updated {}]",
            str_at(repo, "/full_name", str_at(repo, "/slug", "?")),
            visibility,
            date_at(repo, "/updated_on")
        );
        if let Some(desc) = preview_at(repo, "/description") {
            line.push_str(&format!("\n  {desc}"));
        }
        line
    });
    Ok(ToolOutput::from_page(text, &page))
}

pub async fn get_repository(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let url = ctx.url(&["repositories", workspace, repo_slug], &[])?;
    let repo = ctx.get_json(&url).await?;
    let mut text = field_lines(
        &repo,
        &[
            ("Repository", "/full_name"),
            ("Description", "/description"),
            ("Private", "/is_private"),
            ("Language", "/language"),
            ("Main branch", "/mainbranch/name"),
            ("Size (bytes)", "/size"),
            ("Project", "/project/name"),
            ("Web", "/links/html/href"),
        ],
    );
    text.push_str(&format!(
        "\nCreated: {}\nUpdated: {}",
        date_at(&repo, "/created_on"),
        date_at(&repo, "/updated_on")
    ));
    Ok(ToolOutput::new(text, repo))
}

pub async fn list_branches(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let url = ctx.url(
        &["repositories", workspace, repo_slug, "refs", "branches"],
        &paging_query(call)?,
    )?;
    let page = ctx.get_page(&url).await?;
    let text = listing(&format!("Branches of {workspace}/{repo_slug}:"), &page, |branch| {
        format!(
            "- {} @ {} ({})",
            str_at(branch, "/name", "?"),
            short_hash(str_at(branch, "/target/hash", "?")),
            date_at(branch, "/target/date")
        )
    });
    Ok(ToolOutput::from_page(text, &page))
}

fn commit_line(commit: &Value) -> String {
    let summary = preview_at(commit, "/message").unwrap_or_default();
    format!(
        "- {} {} ({}, {})",
        short_hash(str_at(commit, "/hash", "?")),
        summary,
        str_at(
            commit,
            "/author/user/display_name",
            str_at(commit, "/author/raw", "unknown")
        ),
        date_at(commit, "/date")
    )
}

pub async fn list_commits(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let mut segments = vec!["repositories", workspace, repo_slug, "commits"];
    if let Some(branch) = call.get_string("branch").filter(|b| !b.trim().is_empty()) {
        segments.push(branch);
    }
    let url = ctx.url(&segments, &paging_query(call)?)?;
    let page = ctx.get_page(&url).await?;
    let text = listing(&format!("Commits in {workspace}/{repo_slug}:"), &page, commit_line);
    Ok(ToolOutput::from_page(text, &page))
}

pub async fn get_commit(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let commit = require_str(call, "commit")?;
    let url = ctx.url(&["repositories", workspace, repo_slug, "commit", commit], &[])?;
    let data = ctx.get_json(&url).await?;

    let parents = data
        .pointer("/parents")
        .and_then(Value::as_array)
        .map(|ps| {
            ps.iter()
                .filter_map(|p| p.get("hash").and_then(Value::as_str))
                .map(short_hash)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    let text = format!(
        "Commit: {}\nAuthor: {}\nDate: {}\nParents: {}\n\n{}",
        str_at(&data, "/hash", commit),
        str_at(&data, "/author/raw", "unknown"),
        date_at(&data, "/date"),
        if parents.is_empty() { "-" } else { parents.as_str() },
        str_at(&data, "/message", "").trim_end()
    );
    Ok(ToolOutput::new(text, data))
}

pub async fn get_file_content(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let path = require_str(call, "path")?;
    let git_ref = match call.get_string("ref").filter(|r| !r.trim().is_empty()) {
        Some(r) => r.to_string(),
        None => default_branch(ctx, workspace, repo_slug).await?,
    };

    // Path separators stay separators; each component is encoded on its own.
    let mut segments = vec!["repositories", workspace, repo_slug, "src", git_ref.as_str()];
    segments.extend(path.split('/').filter(|s| !s.is_empty()));
    let url = ctx.url(&segments, &[])?;

    let body = ctx.get_text(&url).await?;
    let data = json!({
        "path": path,
        "ref": git_ref,
        "size": body.len(),
        "content": body,
    });
    Ok(ToolOutput::new(clip_text(&body), data))
}

async fn default_branch(
    ctx: &HandlerContext<'_>,
    workspace: &str,
    repo_slug: &str,
) -> Result<String, HandlerError> {
    let url = ctx.url(&["repositories", workspace, repo_slug], &[])?;
    let repo = ctx.get_json(&url).await?;
    Ok(str_at(&repo, "/mainbranch/name", "HEAD").to_string())
}
