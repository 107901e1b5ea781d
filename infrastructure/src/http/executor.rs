//! Request executor: the single path every upstream call takes.
//!
//! Per request:
//!
//! 1. Reject any method other than `GET` before touching the network
//! 2. Build headers (accept, client id, auth) and merge caller headers
//! 3. Up to [`MAX_ATTEMPTS`](super::retry::MAX_ATTEMPTS) attempts, each raced
//!    against the timeout; 5xx, 429 and timeouts are retried with backoff,
//!    everything else is final
//! 4. Decode the successful body as JSON or text
//!
//! The outgoing method is always `GET`, whatever the options say.

use super::headers::{build_request_headers, merge_headers};
use super::retry::{RetryPolicy, RetryState};
use super::sleeper::{Sleeper, TokioSleeper};
use bbmcp_domain::{
    ErrorBody, GatewayConfig, GatewayError, READ_METHOD, RequestOptions, ResponseShape,
    classify_failure,
};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes read-only requests with timeout and retry.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RequestExecutor {
    /// Create an executor with a fresh reqwest client and the default policy.
    pub fn new() -> Result<Self, GatewayError> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// GET `url` and decode the body as JSON.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        config: &GatewayConfig,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let response = self.execute(config, url, options, ResponseShape::Json).await?;
        let body = read_body(response, url).await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET `url` and return the body as text.
    pub async fn execute_text(
        &self,
        config: &GatewayConfig,
        url: &str,
        options: RequestOptions,
    ) -> Result<String, GatewayError> {
        let response = self.execute(config, url, options, ResponseShape::Text).await?;
        read_body(response, url).await
    }

    async fn execute(
        &self,
        config: &GatewayConfig,
        url: &str,
        options: RequestOptions,
        shape: ResponseShape,
    ) -> Result<Response, GatewayError> {
        if let Some(method) = options.method.as_deref()
            && method != READ_METHOD
        {
            warn!(%method, %url, "Rejected non-read request");
            return Err(GatewayError::MethodNotAllowed {
                method: method.to_string(),
                url: url.to_string(),
            });
        }

        let target =
            Url::parse(url).map_err(|e| GatewayError::InvalidUrl(format!("{url}: {e}")))?;
        let headers = merge_headers(
            build_request_headers(shape, config.credential.as_ref()),
            &options.headers,
        );
        let timeout = options.timeout.unwrap_or_else(|| config.timeout());
        let timeout_ms = timeout.as_millis() as u64;

        let mut state = RetryState::new();
        while self.policy.has_attempts_remaining(state.attempt()) {
            let attempt = state.next_attempt();
            debug!(attempt, %url, "Sending request");

            let send = self
                .client
                .request(Method::GET, target.clone())
                .headers(headers.clone())
                .send();

            let error = match tokio::time::timeout(timeout, send).await {
                Ok(Ok(response)) if response.status().is_success() => {
                    debug!(attempt, %url, status = %response.status(), "Request succeeded");
                    return Ok(response);
                }
                Ok(Ok(response)) => {
                    let status = response.status();
                    let raw = response.text().await.unwrap_or_default();
                    let body = ErrorBody::parse(&raw);
                    let failure = classify_failure(
                        status.as_u16(),
                        status.canonical_reason().unwrap_or(""),
                        Some(&body),
                        Some(url),
                    );
                    if !self.policy.is_retryable_status(status.as_u16()) {
                        debug!(attempt, %url, %status, "Request failed permanently");
                        return Err(failure.into());
                    }
                    GatewayError::from(failure)
                }
                Ok(Err(e)) => {
                    debug!(attempt, %url, error = %e, "Transport error");
                    return Err(GatewayError::Network(e.to_string()));
                }
                Err(_) => GatewayError::Timeout {
                    timeout_ms,
                    url: url.to_string(),
                },
            };

            if !self.policy.has_attempts_remaining(attempt) {
                return Err(error);
            }
            let delay = self.policy.delay_for_attempt(attempt);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                %url,
                "Retrying after transient failure: {error}"
            );
            state.record(error);
            self.sleeper.sleep(delay).await;
        }

        if let Some(last) = state.into_last_error() {
            warn!(%url, "Giving up: {last}");
        }
        Err(GatewayError::Exhausted {
            attempts: self.policy.max_attempts,
            url: url.to_string(),
        })
    }
}

async fn read_body(response: Response, url: &str) -> Result<String, GatewayError> {
    response
        .text()
        .await
        .map_err(|e| GatewayError::Network(format!("Failed to read response from {url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::super::sleeper::recording::RecordingSleeper;
    use super::*;
    use bbmcp_domain::{Credential, ResourceKind, UpstreamErrorKind};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{any, header, method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const REPO_PATH: &str = "/repositories/acme/widgets";

    fn executor(sleeper: &RecordingSleeper) -> RequestExecutor {
        RequestExecutor::new()
            .unwrap()
            .with_sleeper(Arc::new(sleeper.clone()))
    }

    fn config(server: &MockServer) -> GatewayConfig {
        GatewayConfig::default().with_base_url(server.uri())
    }

    /// Replays responses in order, repeating the last one.
    struct Sequence {
        calls: AtomicUsize,
        responses: Vec<ResponseTemplate>,
    }

    impl Sequence {
        fn new(responses: Vec<ResponseTemplate>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                responses,
            }
        }
    }

    impl Respond for Sequence {
        fn respond(&self, _request: &Request) -> ResponseTemplate {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses[n.min(self.responses.len() - 1)].clone()
        }
    }

    #[tokio::test]
    async fn test_non_get_methods_never_reach_the_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}{}", server.uri(), REPO_PATH);
        for verb in ["DELETE", "POST", "PUT", "PATCH", "get"] {
            let err = executor(&sleeper)
                .execute_json::<Value>(&config(&server), &url, RequestOptions::new().with_method(verb))
                .await
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Only GET requests are allowed. Attempted: {verb} {url}")
            );
        }
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_get_is_allowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"slug": "widgets"})))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}{}", server.uri(), REPO_PATH);
        let value: Value = executor(&sleeper)
            .execute_json(&config(&server), &url, RequestOptions::new().with_method("GET"))
            .await
            .unwrap();
        assert_eq!(value["slug"], "widgets");
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_three_times_with_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "Repository not found", "detail": "no access"}
            })))
            .expect(3)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}{}", server.uri(), REPO_PATH);
        let err = executor(&sleeper)
            .execute_json::<Value>(&config(&server), &url, RequestOptions::new())
            .await
            .unwrap_err();

        let upstream = (match &err {
            GatewayError::Upstream(e) => Some(e),
            _ => None,
        }).expect("classified upstream error");
        assert_eq!(upstream.status, 500);
        assert_eq!(upstream.kind, UpstreamErrorKind::Upstream);
        assert_eq!(upstream.detail.as_deref(), Some("Repository not found (no access)"));
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "type": "error",
                "error": {"message": "Repository acme/widgets not found"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}{}", server.uri(), REPO_PATH);
        let err = executor(&sleeper)
            .execute_json::<Value>(&config(&server), &url, RequestOptions::new())
            .await
            .unwrap_err();

        let upstream = (match &err {
            GatewayError::Upstream(e) => Some(e),
            _ => None,
        }).unwrap();
        assert_eq!(upstream.kind, UpstreamErrorKind::NotFound);
        assert_eq!(upstream.resource, Some(ResourceKind::Repository));
        assert_eq!(
            upstream.to_string(),
            "Bitbucket API error: 404 Not Found - The requested repository was not found"
        );
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_then_success_sleeps_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(Sequence::new(vec![
                ResponseTemplate::new(429),
                ResponseTemplate::new(200).set_body_json(json!({"slug": "widgets"})),
            ]))
            .expect(2)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}{}", server.uri(), REPO_PATH);
        let value: Value = executor(&sleeper)
            .execute_json(&config(&server), &url, RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(value["slug"], "widgets");
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_timeouts_are_retried_then_succeed() {
        let server = MockServer::start().await;
        let slow = ResponseTemplate::new(200)
            .set_body_json(json!({"slow": true}))
            .set_delay(Duration::from_millis(500));
        Mock::given(method("GET"))
            .and(path(REPO_PATH))
            .respond_with(Sequence::new(vec![
                slow.clone(),
                slow,
                ResponseTemplate::new(200).set_body_json(json!({"slow": false})),
            ]))
            .expect(3)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}{}", server.uri(), REPO_PATH);
        let config = config(&server).with_timeout_ms(100);
        let value: Value = executor(&sleeper)
            .execute_json(&config, &url, RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(value["slow"], false);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_persistent_timeout_reports_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .expect(3)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}{}", server.uri(), REPO_PATH);
        let err = executor(&sleeper)
            .execute_text(
                &config(&server),
                &url,
                RequestOptions::new().with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Timeout { timeout_ms: 50, url });
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_errors_are_not_retried() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sleeper = RecordingSleeper::default();
        let url = format!("http://127.0.0.1:{port}{REPO_PATH}");
        let err = executor(&sleeper)
            .execute_json::<Value>(&GatewayConfig::default(), &url, RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)), "{err:?}");
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_sends_auth_accept_and_client_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repositories/acme/widgets/pullrequests/7/diff"))
            .and(header("Authorization", "Basic YUBiLmNvbTp0b2s="))
            .and(header("Accept", "text/plain"))
            .and(header("User-Agent", super::super::headers::CLIENT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("diff --git a/x b/x\n"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let config = config(&server).with_credential(Credential::new("a@b.com", "tok"));
        let url = format!("{}/repositories/acme/widgets/pullrequests/7/diff", server.uri());
        let body = executor(&sleeper)
            .execute_text(&config, &url, RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(body, "diff --git a/x b/x\n");
    }

    #[tokio::test]
    async fn test_text_variant_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repositories/acme/widgets/pullrequests/7/diff"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/raw/diff", server.uri()).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/diff"))
            .respond_with(ResponseTemplate::new(200).set_body_string("diff --git a/y b/y\n"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}/repositories/acme/widgets/pullrequests/7/diff", server.uri());
        let body = executor(&sleeper)
            .execute_text(&config(&server), &url, RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(body, "diff --git a/y b/y\n");
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_caller_headers_override_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Accept", "application/vnd.custom+json"))
            .and(header("X-Request-Id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let options = RequestOptions::new()
            .with_header("Accept", "application/vnd.custom+json")
            .with_header("X-Request-Id", "42");
        let value: Value = executor(&sleeper)
            .execute_json(&config(&server), &format!("{}/user", server.uri()), options)
            .await
            .unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::default();
        let url = format!("{}/user", server.uri());
        let err = executor(&sleeper)
            .execute_json::<Value>(&config(&server), &url, RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_malformed_url_is_rejected_before_sending() {
        let sleeper = RecordingSleeper::default();
        let err = executor(&sleeper)
            .execute_text(&GatewayConfig::default(), "not a url", RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_zero_attempt_policy_is_exhausted() {
        let sleeper = RecordingSleeper::default();
        let err = executor(&sleeper)
            .with_policy(RetryPolicy {
                max_attempts: 0,
                base_delay: Duration::ZERO,
            })
            .execute_text(
                &GatewayConfig::default(),
                "http://127.0.0.1:9/user",
                RequestOptions::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Request failed after 0 attempts: http://127.0.0.1:9/user"
        );
    }
}
