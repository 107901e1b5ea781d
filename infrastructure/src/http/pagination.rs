//! Pagination walker for Bitbucket listing endpoints.
//!
//! Follows the `next` link of each page until it disappears, concatenating
//! `values`. The walk is capped at [`MAX_PAGES`] fetches; hitting the cap
//! truncates the result and is logged, not reported as an error.

use super::executor::RequestExecutor;
use bbmcp_domain::{GatewayConfig, GatewayError, Page, RequestOptions};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Upper bound on pages fetched by one walk.
pub const MAX_PAGES: usize = 50;

pub struct PageWalker<'a> {
    executor: &'a RequestExecutor,
    max_pages: usize,
}

impl<'a> PageWalker<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self {
            executor,
            max_pages: MAX_PAGES,
        }
    }

    /// Fetch `url` and every page after it. Any page failure aborts the walk.
    pub async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        config: &GatewayConfig,
        url: &str,
    ) -> Result<Vec<T>, GatewayError> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        let mut fetched = 0;

        while let Some(page_url) = next.take() {
            if fetched >= self.max_pages {
                warn!(
                    %url,
                    pages = fetched,
                    items = items.len(),
                    "Pagination limit reached; results truncated"
                );
                break;
            }

            let page: Page<T> = self
                .executor
                .execute_json(config, &page_url, RequestOptions::new())
                .await?;
            fetched += 1;
            debug!(page = fetched, items = page.values.len(), "Fetched page");

            if page.has_next() {
                next = page.next;
            }
            items.extend(page.values);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::super::sleeper::recording::RecordingSleeper;
    use super::*;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn executor() -> RequestExecutor {
        RequestExecutor::new()
            .unwrap()
            .with_sleeper(Arc::new(RecordingSleeper::default()))
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [{"id": 1}, {"id": 2}],
                "next": format!("{}/items-page-2", server.uri())
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items-page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [{"id": 3}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let executor = executor();
        let config = GatewayConfig::default().with_base_url(server.uri());
        let items: Vec<Value> = PageWalker::new(&executor)
            .fetch_all_pages(&config, &format!("{}/items", server.uri()))
            .await
            .unwrap();
        assert_eq!(items, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    }

    #[tokio::test]
    async fn test_stops_after_fifty_pages_without_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        Mock::given(method("GET"))
            .respond_with(move |_: &Request| {
                let n = seen.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_json(json!({
                    "values": [n],
                    "next": format!("{uri}/loop/{}", n + 1)
                }))
            })
            .expect(50)
            .mount(&server)
            .await;

        let executor = executor();
        let config = GatewayConfig::default();
        let items: Vec<usize> = PageWalker::new(&executor)
            .fetch_all_pages(&config, &format!("{}/loop/0", server.uri()))
            .await
            .unwrap();
        assert_eq!(items.len(), MAX_PAGES);
        assert_eq!(items.first(), Some(&0));
        assert_eq!(items.last(), Some(&49));
        assert_eq!(counter.load(Ordering::SeqCst), MAX_PAGES);
    }

    #[tokio::test]
    async fn test_empty_next_ends_the_walk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [], "next": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let executor = executor();
        let items: Vec<Value> = PageWalker::new(&executor)
            .fetch_all_pages(&GatewayConfig::default(), &format!("{}/empty", server.uri()))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_failing_page_aborts_the_walk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/first"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [1],
                "next": format!("{}/repositories/acme/widgets/pullrequests", server.uri())
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repositories/acme/widgets/pullrequests"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let executor = executor();
        let err = PageWalker::new(&executor)
            .fetch_all_pages::<Value>(&GatewayConfig::default(), &format!("{}/first", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bitbucket API error: 403 Forbidden - Access denied to pull request"
        );
    }
}
