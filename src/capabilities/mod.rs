//! External capability interfaces: HTTP fetch, text embedding, text
//! completion, tokenizer, and cache store.
//!
//! These are narrow trait boundaries, not part of the pipeline core; one
//! mock and (for `Fetcher`) one real `reqwest`-backed implementation are
//! provided, matching the spec's "one mock and one remote implementation"
//! framing for backends.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{WebFluxError, WebFluxResult};
use crate::model::FetchResult;

/// Fetches bytes for a URL. Replaces the teacher's `chromiumoxide`-backed
/// browser navigation: full JS rendering is an explicit non-goal, so a
/// plain HTTP GET capability is all the crawl orchestrator needs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> WebFluxResult<FetchResult>;
}

/// `reqwest`-backed `Fetcher`. Follows ≤10 redirects; a 429 with
/// `Retry-After` is surfaced via `FetchResult` so the rate limiter can use
/// it as a delay hint.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()
                .expect("reqwest client builds with default TLS backend"),
        }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> WebFluxResult<FetchResult> {
        let started = std::time::Instant::now();
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let effective_url = response.url().to_string();
        let declared_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.bytes().await?.to_vec();
        let size = body.len();

        Ok(FetchResult {
            status,
            body,
            declared_content_type,
            effective_url,
            response_time: started.elapsed(),
            size,
            retry_after,
        })
    }
}

/// Text-embedding capability, consumed by the Semantic chunking strategy.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, text: &str) -> WebFluxResult<Vec<f32>>;
}

/// Text-completion capability, consumed by the non-`None` reconstruct
/// strategies.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, params: &HashMap<String, String>) -> WebFluxResult<String>;
}

/// Pluggable exact tokenizer; when absent, the Token Counter falls back to
/// its model-family heuristics.
pub trait TokenizerBackend: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/// Key/value cache with TTL, used by the Policy Cache's storage layer when a
/// caller wants persistence beyond the in-process `DashMap` default.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

/// No-op completion backend used in tests and as a default when no remote
/// backend is wired up.
pub struct NoCompletionBackend;

#[async_trait]
impl CompletionBackend for NoCompletionBackend {
    async fn complete(&self, _prompt: &str, _params: &HashMap<String, String>) -> WebFluxResult<String> {
        Err(WebFluxError::CapabilityUnavailable("no text-completion backend configured".to_string()))
    }
}

/// No-op embedding backend; the Semantic chunker falls back to Paragraph
/// when this is in use.
pub struct NoEmbeddingBackend;

#[async_trait]
impl EmbeddingBackend for NoEmbeddingBackend {
    async fn embed(&self, _text: &str) -> WebFluxResult<Vec<f32>> {
        Err(WebFluxError::CapabilityUnavailable("no embedding backend configured".to_string()))
    }
}
