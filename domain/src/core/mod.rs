//! Core domain types: error taxonomy and resource inference

pub mod error;
pub mod resource;
