//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod config_source;
pub mod tool_executor;
pub mod tool_schema;
pub mod upstream_api;
