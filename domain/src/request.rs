//! Request model shared by the executor and its callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// The only HTTP method that may leave the gateway.
pub const READ_METHOD: &str = "GET";

/// Expected response shape; selects the `Accept` header and body decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseShape {
    Json,
    Text,
}

impl ResponseShape {
    pub fn accept_header(&self) -> &'static str {
        match self {
            ResponseShape::Json => "application/json",
            ResponseShape::Text => "text/plain",
        }
    }
}

/// Per-call request options. Built fresh for every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Requested method. Anything other than [`READ_METHOD`] is rejected
    /// before any I/O.
    pub method: Option<String>,
    /// Extra headers, applied over the standard ones.
    pub headers: BTreeMap<String, String>,
    /// Overrides the configured per-attempt timeout.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// One page of a Bitbucket listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    /// Fully-qualified URL of the next page; absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagelen: Option<u64>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }
}
