//! HTTP access to the Bitbucket REST API.
//!
//! - [`headers`]: accept, client id and Basic auth headers
//! - [`retry`]: attempt bound, retryability and backoff
//! - [`executor`]: GET-only request loop with timeout and retry
//! - [`pagination`]: `next`-link walker
//! - [`client`]: the [`UpstreamApi`](bbmcp_application::UpstreamApi) adapter

pub mod client;
pub mod executor;
pub mod headers;
pub mod pagination;
pub mod retry;
pub mod sleeper;

pub use client::BitbucketClient;
pub use executor::RequestExecutor;
pub use headers::{CLIENT_USER_AGENT, build_auth_headers, build_request_headers, merge_headers};
pub use pagination::{MAX_PAGES, PageWalker};
pub use retry::{MAX_ATTEMPTS, RetryPolicy, RetryState};
pub use sleeper::{Sleeper, TokioSleeper};
