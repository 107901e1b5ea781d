//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod handlers;
pub mod invoke_tool;
