//! Pull request tools.
//!
//! Comments and commits of a single pull request are usually short lists, so
//! those two tools walk every page instead of exposing `page`/`pagelen`.

use super::format::{clip_text, date_at, listing, preview_at, short_hash, str_at};
use super::{
    HandlerContext, HandlerError, ToolOutput, paging_query, pull_request_id_param,
    repo_slug_param, require_positive, require_str, with_output_params, with_paging_params,
    workspace_param,
};
use bbmcp_domain::{ToolCall, ToolCategory, ToolDefinition, ToolParameter};
use serde_json::{Value, json};

pub const LIST_PULL_REQUESTS: &str = "bb_list_pull_requests";
pub const GET_PULL_REQUEST: &str = "bb_get_pull_request";
pub const GET_PULL_REQUEST_DIFF: &str = "bb_get_pull_request_diff";
pub const LIST_PULL_REQUEST_COMMENTS: &str = "bb_list_pull_request_comments";
pub const LIST_PULL_REQUEST_COMMITS: &str = "bb_list_pull_request_commits";

/// Pull request states accepted by the upstream `state` filter.
pub const STATES: [&str; 4] = ["OPEN", "MERGED", "DECLINED", "SUPERSEDED"];

fn single_pr(name: &str, description: &str) -> ToolDefinition {
    with_output_params(
        ToolDefinition::new(name, description, ToolCategory::PullRequest).with_parameters([
            workspace_param(),
            repo_slug_param(),
            pull_request_id_param(),
        ]),
    )
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        with_output_params(with_paging_params(
            ToolDefinition::new(
                LIST_PULL_REQUESTS,
                "List pull requests of a repository, filtered by state",
                ToolCategory::PullRequest,
            )
            .with_parameters([workspace_param(), repo_slug_param()])
            .with_parameter(
                ToolParameter::new("state", "Pull request state (default OPEN)", false)
                    .with_allowed_values(STATES),
            ),
        )),
        single_pr(GET_PULL_REQUEST, "Get details of a pull request"),
        single_pr(GET_PULL_REQUEST_DIFF, "Get the unified diff of a pull request"),
        single_pr(
            LIST_PULL_REQUEST_COMMENTS,
            "List every comment on a pull request",
        ),
        single_pr(
            LIST_PULL_REQUEST_COMMITS,
            "List every commit included in a pull request",
        ),
    ]
}

fn pr_segments<'c>(call: &'c ToolCall, id: &'c str) -> Result<Vec<&'c str>, HandlerError> {
    Ok(vec![
        "repositories",
        require_str(call, "workspace")?,
        require_str(call, "repo_slug")?,
        "pullrequests",
        id,
    ])
}

fn branch_arrow(pr: &Value) -> String {
    format!(
        "{} -> {}",
        str_at(pr, "/source/branch/name", "?"),
        str_at(pr, "/destination/branch/name", "?")
    )
}

pub async fn list_pull_requests(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let mut query = paging_query(call)?;
    if let Some(state) = call.get_string("state") {
        query.push(("state", state.to_ascii_uppercase()));
    }
    let url = ctx.url(
        &["repositories", workspace, repo_slug, "pullrequests"],
        &query,
    )?;
    let page = ctx.get_page(&url).await?;
    let text = listing(
        &format!("Pull requests in {workspace}/{repo_slug}:"),
        &page,
        |pr| {
            format!(
                "- #{} {} [{}] by {} ({}, updated {})",
                pr.get("id").map(Value::to_string).unwrap_or_default(),
                str_at(pr, "/title", "(untitled)"),
                str_at(pr, "/state", "?"),
                str_at(pr, "/author/display_name", "unknown"),
                branch_arrow(pr),
                date_at(pr, "/updated_on")
            )
        },
    );
    Ok(ToolOutput::from_page(text, &page))
}

pub async fn get_pull_request(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let id = require_positive(call, "pull_request_id")?.to_string();
    let url = ctx.url(&pr_segments(call, &id)?, &[])?;
    let pr = ctx.get_json(&url).await?;

    let reviewers = pr
        .get("participants")
        .and_then(Value::as_array)
        .map(|ps| {
            ps.iter()
                .filter(|p| p.get("role").and_then(Value::as_str) == Some("REVIEWER"))
                .map(|p| {
                    let approved = p.get("approved").and_then(Value::as_bool) == Some(true);
                    format!(
                        "{}{}",
                        str_at(p, "/user/display_name", "unknown"),
                        if approved { " (approved)" } else { "" }
                    )
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut text = format!(
        "#{id} {}\nState: {}\nAuthor: {}\nBranches: {}\nCreated: {}\nUpdated: {}\nComments: {}",
        str_at(&pr, "/title", "(untitled)"),
        str_at(&pr, "/state", "?"),
        str_at(&pr, "/author/display_name", "unknown"),
        branch_arrow(&pr),
        date_at(&pr, "/created_on"),
        date_at(&pr, "/updated_on"),
        pr.get("comment_count").map(Value::to_string).unwrap_or_else(|| "0".into()),
    );
    if !reviewers.is_empty() {
        text.push_str(&format!("\nReviewers: {}", reviewers.join(", ")));
    }
    let description = str_at(&pr, "/description", "").trim();
    if !description.is_empty() {
        text.push_str(&format!("\n\n{description}"));
    }
    Ok(ToolOutput::new(text, pr))
}

pub async fn get_pull_request_diff(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let id = require_positive(call, "pull_request_id")?.to_string();
    let mut segments = pr_segments(call, &id)?;
    segments.push("diff");
    let url = ctx.url(&segments, &[])?;
    let diff = ctx.get_text(&url).await?;
    let text = if diff.trim().is_empty() {
        "(empty diff)".to_string()
    } else {
        clip_text(&diff)
    };
    let data = json!({ "pull_request_id": id, "size": diff.len(), "diff": diff });
    Ok(ToolOutput::new(text, data))
}

pub async fn list_pull_request_comments(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let id = require_positive(call, "pull_request_id")?.to_string();
    let mut segments = pr_segments(call, &id)?;
    segments.push("comments");
    let url = ctx.url(&segments, &[])?;
    let comments = ctx.get_all_pages(&url).await?;

    let visible: Vec<&Value> = comments
        .iter()
        .filter(|c| c.get("deleted").and_then(Value::as_bool) != Some(true))
        .collect();
    let text = if visible.is_empty() {
        format!("No comments on pull request #{id}")
    } else {
        let lines = visible
            .iter()
            .map(|c| {
                let location = c
                    .pointer("/inline/path")
                    .and_then(Value::as_str)
                    .map(|path| match c.pointer("/inline/to").and_then(Value::as_u64) {
                        Some(line) => format!(" on {path}:{line}"),
                        None => format!(" on {path}"),
                    })
                    .unwrap_or_default();
                format!(
                    "- {} ({}){}: {}",
                    str_at(c, "/user/display_name", "unknown"),
                    date_at(c, "/created_on"),
                    location,
                    preview_at(c, "/content/raw").unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("Comments on pull request #{id} ({}):\n{lines}", visible.len())
    };
    Ok(ToolOutput::from_items(text, comments))
}

pub async fn list_pull_request_commits(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let id = require_positive(call, "pull_request_id")?.to_string();
    let mut segments = pr_segments(call, &id)?;
    segments.push("commits");
    let url = ctx.url(&segments, &[])?;
    let commits = ctx.get_all_pages(&url).await?;

    let text = if commits.is_empty() {
        format!("No commits in pull request #{id}")
    } else {
        let lines = commits
            .iter()
            .map(|c| {
                format!(
                    "- {} {} ({})",
                    short_hash(str_at(c, "/hash", "?")),
                    preview_at(c, "/message").unwrap_or_default(),
                    str_at(c, "/author/raw", "unknown")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("Commits in pull request #{id} ({}):\n{lines}", commits.len())
    };
    Ok(ToolOutput::from_items(text, commits))
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    fn pr_url(rest: &str) -> String {
        format!("{BASE}/repositories/acme/widgets/pullrequests{rest}")
    }

    fn call(name: &str) -> ToolCall {
        ToolCall::new(name)
            .with_arg("workspace", "acme")
            .with_arg("repo_slug", "widgets")
    }

    #[tokio::test]
    async fn test_list_uppercases_state() {
        let url = pr_url("?state=MERGED");
        let api = FakeApi::default().with_json(
            &url,
            json!({"values": [{
                "id": 7, "title": "Add widgets", "state": "MERGED",
                "author": {"display_name": "Ada"},
                "source": {"branch": {"name": "feature"}},
                "destination": {"branch": {"name": "main"}}
            }]}),
        );
        let config = config();
        let ctx = HandlerContext::new(&api, &config);
        let out = list_pull_requests(&ctx, &call(LIST_PULL_REQUESTS).with_arg("state", "merged"))
            .await
            .unwrap();
        assert!(out.text.contains(
            "- #7 Add widgets [MERGED] by Ada (feature -> main, updated -)"
        ));
    }

    #[tokio::test]
    async fn test_get_pull_request_shows_reviewers_and_description() {
        let api = FakeApi::default().with_json(
            &pr_url("/7"),
            json!({
                "id": 7, "title": "Add widgets", "state": "OPEN",
                "author": {"display_name": "Ada"},
                "description": "Adds widgets.\n",
                "comment_count": 2,
                "participants": [
                    {"role": "REVIEWER", "approved": true, "user": {"display_name": "Bob"}},
                    {"role": "PARTICIPANT", "user": {"display_name": "Eve"}}
                ]
            }),
        );
        let config = config();
        let ctx = HandlerContext::new(&api, &config);
        let out = get_pull_request(&ctx, &call(GET_PULL_REQUEST).with_arg("pull_request_id", "7"))
            .await
            .unwrap();
        assert!(out.text.starts_with("#7 Add widgets\nState: OPEN\nAuthor: Ada"));
        assert!(out.text.contains("Comments: 2\nReviewers: Bob (approved)\n\nAdds widgets."));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_id() {
        let api = FakeApi::default();
        let config = config();
        let ctx = HandlerContext::new(&api, &config);
        let err = get_pull_request(&ctx, &call(GET_PULL_REQUEST).with_arg("pull_request_id", 0))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Argument 'pull_request_id' must be a positive integer"
        );
        let err = get_pull_request(&ctx, &call(GET_PULL_REQUEST).with_arg("pull_request_id", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Argument 'pull_request_id' must be an integer");
        assert!(api.requested().is_empty());
    }

    #[tokio::test]
    async fn test_comments_walk_all_pages_and_skip_deleted() {
        let api = FakeApi::default().with_pages(
            &pr_url("/7/comments"),
            vec![
                json!({"user": {"display_name": "Ada"}, "content": {"raw": "Looks good"}}),
                json!({"deleted": true, "content": {"raw": "gone"}}),
                json!({
                    "user": {"display_name": "Bob"},
                    "content": {"raw": "nit"},
                    "inline": {"path": "src/lib.rs", "to": 12}
                }),
            ],
        );
        let config = config();
        let ctx = HandlerContext::new(&api, &config);
        let out = list_pull_request_comments(
            &ctx,
            &call(LIST_PULL_REQUEST_COMMENTS).with_arg("pull_request_id", 7),
        )
        .await
        .unwrap();
        assert_eq!(
            out.text,
            "Comments on pull request #7 (2):\n- Ada (-): Looks good\n- Bob (-) on src/lib.rs:12: nit"
        );
        assert_eq!(out.item_count, Some(3));
    }

    #[tokio::test]
    async fn test_diff_is_returned_verbatim() {
        let diff = "diff --git a/x b/x\n+added\n";
        let api = FakeApi::default().with_text(&pr_url("/7/diff"), diff);
        let config = config();
        let ctx = HandlerContext::new(&api, &config);
        let out = get_pull_request_diff(
            &ctx,
            &call(GET_PULL_REQUEST_DIFF).with_arg("pull_request_id", 7),
        )
        .await
        .unwrap();
        assert_eq!(out.text, diff);
        assert_eq!(out.data["size"], diff.len());
    }

    #[tokio::test]
    async fn test_commits_empty_listing() {
        let api = FakeApi::default().with_pages(&pr_url("/7/commits"), vec![]);
        let config = config();
        let ctx = HandlerContext::new(&api, &config);
        let out = list_pull_request_commits(
            &ctx,
            &call(LIST_PULL_REQUEST_COMMITS).with_arg("pull_request_id", 7),
        )
        .await
        .unwrap();
        assert_eq!(out.text, "No commits in pull request #7");
        assert_eq!(out.item_count, Some(0));
    }
}
