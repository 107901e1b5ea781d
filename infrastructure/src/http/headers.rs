//! Request header construction.
//!
//! Pure helpers: no I/O, no failure modes. Values that cannot be encoded as
//! header values are dropped rather than reported.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bbmcp_domain::{Credential, ResponseShape};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::BTreeMap;
use tracing::warn;

/// Client identification sent with every request.
pub const CLIENT_USER_AGENT: &str = concat!("bitbucket-mcp/", env!("CARGO_PKG_VERSION"));

/// `Authorization: Basic base64(account:token)` when a credential is present,
/// otherwise an empty map.
pub fn build_auth_headers(credential: Option<&Credential>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(credential) = credential {
        let encoded = STANDARD.encode(format!("{}:{}", credential.account(), credential.token()));
        match HeaderValue::from_str(&format!("Basic {encoded}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Credential could not be encoded as a header; sending unauthenticated"),
        }
    }
    headers
}

/// `Accept`, `User-Agent` and the auth header for one request.
pub fn build_request_headers(shape: ResponseShape, credential: Option<&Credential>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(shape.accept_header()));
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.extend(build_auth_headers(credential));
    headers
}

/// Apply caller headers on top of `base`; the caller wins on conflict.
pub fn merge_headers(mut base: HeaderMap, extra: &BTreeMap<String, String>) -> HeaderMap {
    for (name, value) in extra {
        let parsed = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        );
        match parsed {
            (Ok(name), Ok(value)) => {
                base.insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid request header"),
        }
    }
    base
}
