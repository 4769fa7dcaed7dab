//! Backend-for-frontend proxy client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Response caching for GET requests
//!
//! Implements every collaborator contract the engine consumes: keyword,
//! vector and citation-graph search, paper lookup, and the primary review
//! and deep-dive analyses.

mod collaborators;

use std::time::Duration;

use anyhow::Context;
use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;

pub use collaborators::ProxyStrategy;

use crate::config::{Config, api};
use crate::engine::StrategyKind;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    DeepDiveRequest, PaperRecord, PrimaryDeepDiveOutput, PrimaryReviewOutput, ReviewRequest,
};

/// Search response envelope.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, alias = "results", alias = "data")]
    papers: Vec<PaperRecord>,
}

/// Proxy API client.
#[derive(Clone)]
pub struct ProxyClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// Proxy base URL.
    proxy_url: String,

    /// Parsed base URL for building escaped path segments.
    base_url: reqwest::Url,

    /// Result limit sent with search requests.
    search_limit: usize,
}

impl ProxyClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the proxy URL is not an absolute base URL or HTTP
    /// client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let proxy_url = config.proxy_url.trim_end_matches('/').to_string();
        let base_url = reqwest::Url::parse(&proxy_url)
            .with_context(|| format!("invalid proxy URL '{proxy_url}'"))?;
        anyhow::ensure!(!base_url.cannot_be_a_base(), "proxy URL '{proxy_url}' cannot take a path");

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().expect("valid content-type header"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(500), Duration::from_secs(10))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            client,
            cache,
            proxy_url,
            base_url,
            search_limit: config.candidates_per_strategy,
        })
    }

    /// Proxy base URL.
    #[must_use]
    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    /// Search papers with the given retrieval signal.
    ///
    /// # Errors
    ///
    /// Returns error on proxy failure.
    pub async fn search(&self, kind: StrategyKind, query: &str) -> ClientResult<Vec<PaperRecord>> {
        let endpoint = match kind {
            StrategyKind::Keyword => "keyword",
            StrategyKind::VectorSimilarity => "vector",
            StrategyKind::CitationGraph => "citations",
        };
        let url = format!("{}/search/{endpoint}", self.proxy_url);
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("limit".to_string(), self.search_limit.to_string()),
        ];

        let response: SearchResponse = self.get(&url, &params).await?;
        Ok(response.papers)
    }

    /// Get a single paper by identifier.
    ///
    /// # Errors
    ///
    /// Returns error on proxy failure, `NotFound` for unknown papers.
    pub async fn get_paper(&self, paper_id: &str) -> ClientResult<PaperRecord> {
        let url = self.paper_url(paper_id);
        self.get(url.as_str(), &[]).await
    }

    /// `{proxy}/papers/{id}` with the id percent-encoded as one segment.
    fn paper_url(&self, paper_id: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("papers").push(paper_id);
        }
        url
    }

    /// Run the primary multi-paper review analysis.
    ///
    /// # Errors
    ///
    /// Returns error on proxy failure.
    pub async fn review_analysis(&self, request: &ReviewRequest) -> ClientResult<PrimaryReviewOutput> {
        let url = format!("{}/analysis/review", self.proxy_url);
        self.post(&url, &serde_json::to_value(request)?).await
    }

    /// Run the primary single-paper deep-dive analysis.
    ///
    /// # Errors
    ///
    /// Returns error on proxy failure.
    pub async fn deep_dive_analysis(
        &self,
        request: &DeepDiveRequest,
    ) -> ClientResult<PrimaryDeepDiveOutput> {
        let url = format!("{}/analysis/deep-dive", self.proxy_url);
        self.post(&url, &serde_json::to_value(request)?).await
    }

    /// Make a GET request.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // Check cache
        let cache_key = Self::cache_key("GET", url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::trace!(url, "Cache hit");
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        let response = self.client.get(url).query(params).send().await?;

        let response = Self::handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        // Cache response
        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Make a POST request. Responses are never cached.
    async fn post<T>(&self, url: &str, body: &serde_json::Value) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body_str = serde_json::to_string(body)?;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body_str)
            .send()
            .await?;

        let response = Self::handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Handle proxy response status codes.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            408 | 504 => Err(ClientError::Timeout(api::REQUEST_TIMEOUT)),
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for ProxyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyClient").field("proxy_url", &self.proxy_url).finish()
    }
}
