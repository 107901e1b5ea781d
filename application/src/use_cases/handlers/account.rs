//! Account and workspace tools.

use super::format::{date_at, field_lines, listing, str_at};
use super::{
    HandlerContext, HandlerError, ToolOutput, paging_query, require_str, with_output_params,
    with_paging_params, workspace_param,
};
use bbmcp_domain::{ToolCall, ToolCategory, ToolDefinition};

pub const GET_CURRENT_USER: &str = "bb_get_current_user";
pub const LIST_WORKSPACES: &str = "bb_list_workspaces";
pub const GET_WORKSPACE: &str = "bb_get_workspace";

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        with_output_params(ToolDefinition::new(
            GET_CURRENT_USER,
            "Show the Bitbucket account the configured credentials belong to",
            ToolCategory::Account,
        )),
        with_output_params(with_paging_params(ToolDefinition::new(
            LIST_WORKSPACES,
            "List workspaces the authenticated account can access",
            ToolCategory::Workspace,
        ))),
        with_output_params(
            ToolDefinition::new(
                GET_WORKSPACE,
                "Get details of a single workspace",
                ToolCategory::Workspace,
            )
            .with_parameter(workspace_param()),
        ),
    ]
}

pub async fn get_current_user(
    ctx: &HandlerContext<'_>,
    _call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let url = ctx.url(&["user"], &[])?;
    let user = ctx.get_json(&url).await?;
    let text = field_lines(
        &user,
        &[
            ("Name", "/display_name"),
            ("Nickname", "/nickname"),
            ("Account ID", "/account_id"),
            ("UUID", "/uuid"),
            ("Created", "/created_on"),
        ],
    );
    Ok(ToolOutput::new(text, user))
}

pub async fn list_workspaces(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let url = ctx.url(&["workspaces"], &paging_query(call)?)?;
    let page = ctx.get_page(&url).await?;
    let text = listing("Workspaces:", &page, |ws| {
        format!(
            "- {} ({})",
            str_at(ws, "/slug", "?"),
            str_at(ws, "/name", "unnamed")
        )
    });
    Ok(ToolOutput::from_page(text, &page))
}

pub async fn get_workspace(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let url = ctx.url(&["workspaces", workspace], &[])?;
    let ws = ctx.get_json(&url).await?;
    let mut text = field_lines(
        &ws,
        &[
            ("Workspace", "/slug"),
            ("Name", "/name"),
            ("UUID", "/uuid"),
            ("Private", "/is_private"),
        ],
    );
    text.push_str(&format!("\nCreated: {}", date_at(&ws, "/created_on")));
    Ok(ToolOutput::new(text, ws))
}
