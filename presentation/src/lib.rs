//! Presentation layer for bitbucket-mcp
//!
//! This crate contains the CLI definition, the MCP JSON-RPC server that
//! speaks to the assistant over stdio, and the renderer that turns tool
//! results into text or filtered JSON.

pub mod cli;
pub mod mcp;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, CliOutputFormat, Command};
pub use mcp::protocol::{JsonRpcResponse, ProtocolError, RpcError};
pub use mcp::server::McpServer;
pub use output::renderer::{Rendered, ResultRenderer};
