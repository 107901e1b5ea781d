//! CLI command definitions

use bbmcp_domain::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format override for `call`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliOutputFormat {
    /// Readable summary
    Text,
    /// Pretty-printed JSON payload
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Text => OutputFormat::Text,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for bitbucket-mcp
#[derive(Parser, Debug)]
#[command(name = "bitbucket-mcp")]
#[command(author, version, about = "Read-only Bitbucket Cloud tools over the Model Context Protocol")]
#[command(long_about = r#"
bitbucket-mcp exposes read-only Bitbucket Cloud operations (repositories, pull
requests, issues, pipelines) as MCP tools over stdio.

Credentials and settings are resolved on every tool call from (lowest to highest priority):
1. ~/.config/bitbucket-mcp/config.toml   Global config
2. ./bitbucket-mcp.toml                  Project-level config
3. --config <path>                       Explicit config file
4. BITBUCKET_EMAIL, BITBUCKET_API_TOKEN, BITBUCKET_BASE_URL, BITBUCKET_TIMEOUT_MS

Example:
  bitbucket-mcp serve
  bitbucket-mcp tools
  bitbucket-mcp call list_prs '{"workspace": "acme", "repo_slug": "widgets"}'
  bitbucket-mcp --no-config show-config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files (environment only)
    #[arg(long, global = true, conflicts_with = "config")]
    pub no_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The subcommand to run; `serve` when none is given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Print the tool catalog as JSON Schema
    Tools,

    /// Invoke one tool and print its result
    Call {
        /// Tool name or alias
        tool: String,

        /// Arguments as a JSON object
        #[arg(value_name = "ARGS_JSON")]
        args: Option<String>,

        /// Output format (overrides the configured default)
        #[arg(short, long, value_enum)]
        output: Option<CliOutputFormat>,
    },

    /// Show configuration sources and the resolved configuration
    ShowConfig,
}
