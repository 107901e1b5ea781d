//! Pipelines tool.

use super::format::clip_text;
use super::{
    HandlerContext, HandlerError, ToolOutput, repo_slug_param, require_str, with_output_params,
    workspace_param,
};
use bbmcp_domain::{ToolCall, ToolCategory, ToolDefinition, ToolParameter};
use serde_json::json;

pub const GET_PIPELINE_STEP_LOG: &str = "bb_get_pipeline_step_log";

pub fn definitions() -> Vec<ToolDefinition> {
    vec![with_output_params(
        ToolDefinition::new(
            GET_PIPELINE_STEP_LOG,
            "Fetch the raw log of one pipeline step",
            ToolCategory::Pipeline,
        )
        .with_parameters([workspace_param(), repo_slug_param()])
        .with_parameter(ToolParameter::new(
            "pipeline_uuid",
            "Pipeline UUID, with or without braces",
            true,
        ))
        .with_parameter(ToolParameter::new(
            "step_uuid",
            "Step UUID, with or without braces",
            true,
        )),
    )]
}

/// Bitbucket addresses pipelines by `{uuid}`; callers often drop the braces.
fn braced(uuid: &str) -> String {
    let trimmed = uuid.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        trimmed.to_string()
    } else {
        format!("{{{trimmed}}}")
    }
}

pub async fn get_pipeline_step_log(
    ctx: &HandlerContext<'_>,
    call: &ToolCall,
) -> Result<ToolOutput, HandlerError> {
    let workspace = require_str(call, "workspace")?;
    let repo_slug = require_str(call, "repo_slug")?;
    let pipeline = braced(require_str(call, "pipeline_uuid")?);
    let step = braced(require_str(call, "step_uuid")?);
    let url = ctx.url(
        &[
            "repositories",
            workspace,
            repo_slug,
            "pipelines",
            pipeline.as_str(),
            "steps",
            step.as_str(),
            "log",
        ],
        &[],
    )?;
    let log = ctx.get_text(&url).await?;
    let text = if log.is_empty() {
        "(empty log)".to_string()
    } else {
        clip_text(&log)
    };
    let data = json!({
        "pipeline_uuid": pipeline,
        "step_uuid": step,
        "size": log.len(),
        "log": log,
    });
    Ok(ToolOutput::new(text, data))
}
