//! CLI entrypoint for bitbucket-mcp
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use bbmcp_application::{ConfigSource, InvokeToolUseCase, ToolExecutorPort, ToolSchemaPort};
use bbmcp_domain::{OutputFormat, ToolCall};
use bbmcp_infrastructure::{BitbucketClient, ConfigLoader, FileConfigSource, JsonSchemaToolConverter};
use bbmcp_presentation::{Cli, CliOutputFormat, Command, McpServer, ResultRenderer};
use clap::Parser;
use serde_json::{Value, json};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs never go to stdout; it carries the protocol.
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting bitbucket-mcp {}", env!("CARGO_PKG_VERSION"));

    // === Dependency Injection ===
    let config_source: Arc<dyn ConfigSource> = if cli.no_config {
        Arc::new(FileConfigSource::env_only())
    } else {
        Arc::new(FileConfigSource::new(cli.config.clone()))
    };
    let api = Arc::new(BitbucketClient::new()?);
    let use_case = Arc::new(InvokeToolUseCase::new(api, config_source.clone()));
    let schema = Arc::new(JsonSchemaToolConverter);

    match cli.command() {
        Command::Serve => {
            serve(use_case, schema, config_source).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Tools => {
            let tools = schema.all_tools_schema(use_case.tool_spec());
            println!("{}", serde_json::to_string_pretty(&json!({ "tools": tools }))?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Call { tool, args, output } => {
            call(use_case.as_ref(), config_source.as_ref(), &tool, args.as_deref(), output).await
        }
        Command::ShowConfig => {
            show_config(cli.config.as_deref(), cli.no_config, config_source.as_ref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` applies when no `-v` is given.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("--log-file must name a file: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

async fn serve(
    use_case: Arc<InvokeToolUseCase>,
    schema: Arc<JsonSchemaToolConverter>,
    config: Arc<dyn ConfigSource>,
) -> Result<()> {
    let server = McpServer::new(use_case, schema, config);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal.cancel(),
            Err(e) => warn!("Failed to listen for ctrl-c: {}", e),
        }
    });

    server
        .serve(tokio::io::stdin(), tokio::io::stdout(), shutdown)
        .await
        .context("MCP server I/O failed")?;
    Ok(())
}

async fn call(
    use_case: &InvokeToolUseCase,
    config: &dyn ConfigSource,
    tool: &str,
    args: Option<&str>,
    output: Option<CliOutputFormat>,
) -> Result<ExitCode> {
    let arguments: Value = match args {
        Some(raw) => serde_json::from_str(raw).context("ARGS_JSON is not valid JSON")?,
        None => json!({}),
    };
    if !arguments.is_object() {
        bail!("ARGS_JSON must be a JSON object, got: {}", arguments);
    }

    let call = ToolCall::from_json(tool, &arguments);
    let result = use_case.execute(&call).await;

    let default_format = match output {
        Some(format) => format.into(),
        None => config
            .load()
            .map(|c| c.default_output)
            .unwrap_or(OutputFormat::Text),
    };
    let rendered = ResultRenderer::new(default_format).render(&result, &call);

    if rendered.is_error {
        eprintln!("{}", rendered.text);
        Ok(ExitCode::FAILURE)
    } else {
        println!("{}", rendered.text);
        Ok(ExitCode::SUCCESS)
    }
}

fn show_config(config_path: Option<&Path>, no_config: bool, source: &dyn ConfigSource) -> Result<()> {
    if no_config {
        println!("Configuration files disabled (--no-config); environment only");
    } else {
        ConfigLoader::print_config_sources(config_path);
    }
    println!();

    let config = source.load()?;
    println!("Resolved configuration:");
    println!("  base_url:      {}", config.base_url);
    println!("  timeout_ms:    {}", config.timeout_ms);
    println!("  output.format: {}", config.default_output.as_str());
    match &config.credential {
        Some(credential) => {
            println!("  email:         {}", credential.account());
            println!("  api_token:     <redacted>");
        }
        None => println!("  credentials:   none (unauthenticated, public repositories only)"),
    }
    Ok(())
}
