//! Output rendering for tool results

pub mod renderer;
