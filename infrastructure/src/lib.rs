//! Infrastructure layer for bitbucket-mcp
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Bitbucket HTTP client, configuration
//! file loading and the tool schema converter.

pub mod config;
pub mod http;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBitbucketConfig, FileConfig, FileConfigSource,
    FileOutputConfig,
};
pub use http::{
    BitbucketClient, MAX_ATTEMPTS, MAX_PAGES, PageWalker, RequestExecutor, RetryPolicy,
    build_auth_headers, build_request_headers,
};
pub use tools::JsonSchemaToolConverter;
