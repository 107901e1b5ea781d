//! Error taxonomy for upstream requests.
//!
//! Every non-2xx response is classified into an [`UpstreamError`] by
//! [`classify_failure`]. Client-side failures (timeouts, transport errors,
//! the read-only guard) are the remaining [`GatewayError`] variants.
//!
//! | Status | Kind | Detail | Hint |
//! |--------|------|--------|------|
//! | 401 | `Authentication` | from body | names both credential variables |
//! | 403 | `Forbidden` | `Access denied to <kind>` | check permissions |
//! | 404 | `NotFound` | `The requested <kind> was not found` | check identifiers |
//! | 429 | `RateLimited` | synthesized | wait before retrying |
//! | other | `Upstream` | from body | none |

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::resource::{ResourceKind, infer_resource_kind};

/// Name used in every upstream error message.
pub const UPSTREAM_NAME: &str = "Bitbucket";

/// Environment variables naming the two credential parts.
pub const ACCOUNT_ENV_VAR: &str = "BITBUCKET_EMAIL";
pub const TOKEN_ENV_VAR: &str = "BITBUCKET_API_TOKEN";

/// Classification of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamErrorKind {
    /// HTTP 401
    Authentication,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    NotFound,
    /// HTTP 429
    RateLimited,
    /// Any other non-success status
    Upstream,
}

/// A classified upstream failure. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub status: u16,
    pub status_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceKind>,
}

impl UpstreamError {
    /// Message for the tool boundary: the display string plus the hint.
    pub fn user_message(&self) -> String {
        match &self.hint {
            Some(hint) => format!("{self}\nHint: {hint}"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} API error: {} {}",
            UPSTREAM_NAME, self.status, self.status_text
        )?;
        if let Some(detail) = self.detail.as_deref().filter(|d| !d.is_empty()) {
            write!(f, " - {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for UpstreamError {}

/// Best-effort view of an upstream error body.
///
/// Bitbucket usually answers `{"type": "error", "error": {"message", "detail"}}`
/// but proxies and older endpoints send `{"message"}` or plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub error_message: Option<String>,
    pub error_detail: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parse a raw response body. Non-JSON bodies become `{message: raw}`.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self {
                message: non_empty(raw.trim()),
                ..Default::default()
            },
        }
    }

    pub fn from_value(value: &serde_json::Value) -> Self {
        let text = |v: Option<&serde_json::Value>| v.and_then(|v| v.as_str()).and_then(non_empty);
        let error = value.get("error");
        Self {
            error_message: text(error.and_then(|e| e.get("message"))),
            error_detail: text(error.and_then(|e| e.get("detail"))),
            message: text(value.get("message")),
        }
    }

    /// `error.message (error.detail)`, else `message`, else nothing.
    pub fn detail(&self) -> Option<String> {
        match (&self.error_message, &self.error_detail) {
            (Some(message), Some(detail)) => Some(format!("{message} ({detail})")),
            (Some(message), None) => Some(message.clone()),
            _ => self.message.clone(),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Classify a failed upstream response.
pub fn classify_failure(
    status: u16,
    status_text: &str,
    body: Option<&ErrorBody>,
    url: Option<&str>,
) -> UpstreamError {
    let resource = url.map(infer_resource_kind);
    let kind_label = resource.unwrap_or(ResourceKind::Resource).label();
    let body_detail = body.and_then(ErrorBody::detail);

    let (kind, status_text, detail, hint) = match status {
        401 => (
            UpstreamErrorKind::Authentication,
            status_text.to_string(),
            Some(body_detail.unwrap_or_else(|| "Authentication failed".to_string())),
            Some(format!(
                "Check that {ACCOUNT_ENV_VAR} and {TOKEN_ENV_VAR} are set to a valid account email and API token"
            )),
        ),
        403 => (
            UpstreamErrorKind::Forbidden,
            status_text.to_string(),
            Some(format!("Access denied to {kind_label}")),
            Some(format!(
                "Verify that your credentials have read access to this {kind_label}"
            )),
        ),
        404 => (
            UpstreamErrorKind::NotFound,
            status_text.to_string(),
            Some(format!("The requested {kind_label} was not found")),
            Some("Check that the workspace, repository and other identifiers are correct and that you have permission to view them".to_string()),
        ),
        429 => (
            UpstreamErrorKind::RateLimited,
            "Too Many Requests".to_string(),
            Some("Rate limit exceeded".to_string()),
            Some("Wait a moment before retrying".to_string()),
        ),
        _ => (
            UpstreamErrorKind::Upstream,
            status_text.to_string(),
            body_detail,
            None,
        ),
    };

    UpstreamError {
        kind,
        status,
        status_text,
        detail,
        hint,
        resource,
    }
}

/// Every failure the request layer can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    #[error("Request timeout after {timeout_ms}ms: {url}")]
    Timeout { timeout_ms: u64, url: String },

    /// Attempted a non-read method. Raised before any network I/O.
    #[error("Only GET requests are allowed. Attempted: {method} {url}")]
    MethodNotAllowed { method: String, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Request failed after {attempts} attempts: {url}")]
    Exhausted { attempts: u32, url: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Self-contained message for the caller, including remediation hints.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Upstream(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
