//! Crawl Orchestrator: drives a bounded worker pool over the frontier,
//! running each URL through fetch, extract, reconstruct, and chunk, while
//! enforcing policy, rate limits, and the retry budget.
//!
//! Worker-pool shape (fill-up-to-concurrency over a `FuturesUnordered`) is
//! grounded on `crawl_engine::orchestrator::crawl_pages`; this version swaps
//! the teacher's browser-pool/semaphore pairing for a single fetcher shared
//! across workers, since there is no browser resource to pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::FuturesUnordered;
use futures::StreamExt;

use crate::capabilities::{CompletionBackend, EmbeddingBackend, Fetcher};
use crate::chunking::{resolve_registry_name, select_strategy, ChunkingParams, ChunkingRegistry, ContentCharacteristics};
use crate::config::{CrawlConfiguration, ReconstructOptions};
use crate::error::{WebFluxError, WebFluxResult};
use crate::events::{CrawlEvent, CrawlEventBus};
use crate::extract::extract_facts;
use crate::metadata::extract_metadata;
use crate::model::{ExtractedContent, UrlRecord};
use crate::policy::PolicyCache;
use crate::progress::ProgressTracker;
use crate::quality::evaluate_quality;
use crate::rate_limiter::{HostPolicy, RateLimiter};
use crate::reconstruct::resolve_strategy;
use crate::tokens::TokenCounter;
use crate::cancel::Cancellation;

use super::frontier::Frontier;
use super::retry::{backoff_delay, clamp_retry_after, FailureKind};

/// What a worker produced for one dequeued URL.
enum UrlOutcome {
    Succeeded { chunk_count: usize, chunks: Vec<crate::chunking::Chunk> },
    Requeued,
    Failed,
}

/// Everything a crawl job needs that isn't part of its per-job configuration.
pub struct Orchestrator<F: Fetcher> {
    pub fetcher: Arc<F>,
    pub policy: Arc<PolicyCache<F>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub tokens: Arc<TokenCounter>,
    pub events: CrawlEventBus,
    pub progress: Arc<ProgressTracker>,
    pub cancel: Cancellation,
    pub completion: Option<Arc<dyn CompletionBackend>>,
    pub embeddings: Option<Arc<dyn EmbeddingBackend>>,
    pub chunking: Arc<ChunkingRegistry>,
}

/// Result of a completed crawl job.
pub struct CrawlOutcome {
    pub chunks: Vec<crate::chunking::Chunk>,
    pub urls_succeeded: usize,
    pub urls_failed: usize,
}

fn classify_status(status: u16) -> Option<WebFluxError> {
    match status {
        200..=299 => None,
        429 => Some(WebFluxError::QuotaExceeded("http 429".to_string())),
        400..=499 => Some(WebFluxError::NetworkPermanent(format!("http status {status}"))),
        _ => Some(WebFluxError::NetworkTransient(format!("http status {status}"))),
    }
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url).ok().and_then(|u| u.host_str().map(|s| s.to_string()))
}

fn build_characteristics(metadata: &crate::metadata::MetadataBundle, token_count: usize, has_images: bool) -> ContentCharacteristics {
    let section_count = metadata.structure.section_count;
    ContentCharacteristics {
        token_count,
        has_images,
        complexity_score: metadata.structure.complexity_score,
        structure_score: (section_count as f64 / 10.0).min(1.0),
    }
}

impl<F: Fetcher + 'static> Orchestrator<F> {
    /// Resolves robots and rate-limiting policy for `url`'s host, returning
    /// `RobotsDisallow` when the path is off-limits for `user_agent`.
    async fn resolve_host_policy(&self, url: &str, user_agent: &str, default_delay: Duration) -> WebFluxResult<HostPolicy> {
        let robots = self.policy.robots_for(url).await;
        let parsed = url::Url::parse(url).map_err(|e| WebFluxError::ParseError(e.to_string()))?;
        if !robots.is_allowed(parsed.path(), user_agent) {
            return Err(WebFluxError::RobotsDisallow);
        }
        Ok(HostPolicy::new(robots.crawl_delay(user_agent), default_delay)
            .with_request_rate(robots.request_rate(user_agent).cloned())
            .with_visit_time(robots.visit_time(user_agent).cloned()))
    }

    /// Fetches, extracts, reconstructs, and chunks a single URL. Returns
    /// `Ok(chunks)` on success or the classified failure on error; the
    /// caller decides whether to retry.
    #[allow(clippy::too_many_arguments)]
    async fn process_once(
        &self,
        record: &UrlRecord,
        config: &CrawlConfiguration,
        reconstruct_options: &ReconstructOptions,
        chunking_params: &ChunkingParams,
        frontier: &Frontier,
    ) -> WebFluxResult<(Vec<crate::chunking::Chunk>, u16, Duration, Option<String>)> {
        let user_agent = config.user_agent();

        let host_policy = self.resolve_host_policy(&record.url, user_agent, config.default_crawl_delay()).await?;
        let host = host_of(&record.url).unwrap_or_default();
        self.rate_limiter.acquire(&host, &host_policy, &self.cancel).await?;

        let fetch_result = self.fetcher.fetch(&record.url, user_agent, config.fetch_timeout()).await?;
        if let Some(err) = classify_status(fetch_result.status) {
            return Err(err);
        }

        let html = fetch_result.body_as_str();
        let facts = extract_facts(&html, &record.url);
        let metadata = extract_metadata(&html, &facts.main_text);
        let quality = evaluate_quality(
            &record.url,
            &html,
            &facts.main_text,
            facts.title.as_deref(),
            metadata.schema_org.main_entity_type.is_some(),
            facts.headings.len(),
        );
        let language = quality.language.clone();

        let extracted = ExtractedContent {
            source_url: record.url.clone(),
            raw_html: html,
            main_text: facts.main_text,
            title: facts.title,
            headings: facts.headings,
            images: facts.images,
            links: facts.links,
            metadata,
            language,
            quality,
        };

        frontier.enqueue_links(&record.url, record.depth, &extracted.links.iter().map(|l| l.url.clone()).collect::<Vec<_>>()).await;

        let strategy = resolve_strategy(&extracted, reconstruct_options, self.completion.as_deref())?;
        let reconstructed = strategy.reconstruct(&extracted, reconstruct_options.parameters(), self.completion.as_deref()).await?;

        let mut content_for_chunking = extracted.clone();
        content_for_chunking.main_text = reconstructed.text;

        let token_count = self.tokens.count_tokens(&content_for_chunking.main_text, "generic");
        let characteristics = build_characteristics(&content_for_chunking.metadata, token_count, !content_for_chunking.images.is_empty());
        let recommendation = select_strategy(&characteristics, &std::collections::HashMap::new());
        let registry_name = resolve_registry_name(&recommendation.strategy);
        let chunker = self
            .chunking
            .get(registry_name)
            .ok_or_else(|| WebFluxError::Internal(format!("no registered chunking strategy '{registry_name}'")))?;
        let chunks = chunker.chunk(&content_for_chunking, chunking_params, self.embeddings.as_deref()).await?;

        Ok((chunks, fetch_result.status, fetch_result.response_time, fetch_result.declared_content_type))
    }

    /// Runs one dequeued URL to completion, including the retry/backoff
    /// cycle, publishing progress and lifecycle events as it goes.
    async fn run_one(
        &self,
        mut record: UrlRecord,
        config: Arc<CrawlConfiguration>,
        reconstruct_options: Arc<ReconstructOptions>,
        chunking_params: Arc<ChunkingParams>,
        frontier: Arc<Frontier>,
    ) -> UrlOutcome {
        self.progress.start_url(&record.url);
        let _ = self.events.publish(CrawlEvent::url_processing_started(record.url.clone(), record.depth)).await;

        match self.process_once(&record, &config, &reconstruct_options, &chunking_params, &frontier).await {
            Ok((chunks, status, response_time, content_type)) => {
                self.progress.complete_url(&record.url, chunks.len(), response_time, status, content_type.as_deref());
                let _ = self
                    .events
                    .publish(CrawlEvent::url_processed(record.url.clone(), chunks.len(), response_time.as_millis() as u64))
                    .await;
                UrlOutcome::Succeeded { chunk_count: chunks.len(), chunks }
            }
            Err(error) => {
                let kind = FailureKind::classify(&error);

                if kind.is_retryable() && record.retry_count < config.retry_budget() {
                    record.retry_count += 1;
                    let delay = match &error {
                        WebFluxError::QuotaExceeded(_) => clamp_retry_after(Duration::from_secs(1)),
                        _ => backoff_delay(record.retry_count, kind),
                    };
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.cancel.cancelled() => {}
                    }
                    if !self.cancel.is_cancelled() {
                        frontier.requeue(record).await;
                        return UrlOutcome::Requeued;
                    }
                }

                self.progress.fail_url(&record.url, kind.event_error_type(), &error.to_string(), None, record.retry_count);
                let _ = self
                    .events
                    .publish(CrawlEvent::url_processing_failed(
                        record.url.clone(),
                        kind.event_error_type(),
                        error.to_string(),
                        None,
                        record.retry_count,
                    ))
                    .await;
                UrlOutcome::Failed
            }
        }
    }

    /// Runs the crawl job to completion: seeds the frontier, drains it
    /// through a bounded worker pool, and returns every chunk produced.
    ///
    /// Event ordering: `CrawlStarted` is published before any per-URL event;
    /// every per-URL terminal event (`UrlProcessed`/`UrlProcessingFailed`)
    /// is published before `CrawlCompleted`, which fires only once the
    /// frontier is drained and every in-flight worker has finished.
    pub async fn run(
        &self,
        job_id: &str,
        config: &CrawlConfiguration,
        reconstruct_options: &ReconstructOptions,
        chunking_params: &ChunkingParams,
    ) -> WebFluxResult<CrawlOutcome> {
        let started = Instant::now();
        let frontier = Arc::new(Frontier::new(config));
        frontier.seed(config).await;

        self.events
            .publish(CrawlEvent::crawl_started(job_id, config.seed_urls().to_vec(), config.max_depth()))
            .await
            .ok();

        let config = Arc::new(config.clone());
        let reconstruct_options = Arc::new(reconstruct_options.clone());
        let chunking_params = Arc::new(chunking_params.clone());

        let mut chunks = Vec::new();
        let mut urls_succeeded = 0;
        let mut urls_failed = 0;
        let mut in_flight = FuturesUnordered::new();

        loop {
            if self.cancel.is_cancelled() {
                let grace = config.grace_period();
                tokio::select! {
                    _ = async { while in_flight.next().await.is_some() {} } => {}
                    _ = tokio::time::sleep(grace) => {}
                }
                break;
            }

            while in_flight.len() < config.worker_count() {
                let Some(record) = frontier.dequeue().await else { break };
                if let Some(timeout) = config.job_timeout() {
                    if started.elapsed() >= timeout {
                        self.cancel.cancel();
                        break;
                    }
                }
                let fut = self.run_one(record, config.clone(), reconstruct_options.clone(), chunking_params.clone(), frontier.clone());
                in_flight.push(fut);
            }

            if in_flight.is_empty() && frontier.is_empty().await {
                break;
            }

            match in_flight.next().await {
                Some(UrlOutcome::Succeeded { chunks: mut new_chunks, .. }) => {
                    urls_succeeded += 1;
                    chunks.append(&mut new_chunks);
                }
                Some(UrlOutcome::Failed) => urls_failed += 1,
                Some(UrlOutcome::Requeued) => {}
                None => {
                    if frontier.is_empty().await {
                        break;
                    }
                }
            }
        }

        crate::chunking::renumber(&mut chunks);
        self.progress.complete();
        let _ = self
            .events
            .publish(CrawlEvent::crawl_completed(urls_succeeded, chunks.len(), started.elapsed().as_millis() as u64))
            .await;

        Ok(CrawlOutcome { chunks, urls_succeeded, urls_failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{NoCompletionBackend, NoEmbeddingBackend, ReqwestFetcher};
    use crate::config::{ChunkingOptionsBuilder, CrawlConfigBuilder, ReconstructOptionsBuilder};
    use crate::error::WebFluxResult;
    use crate::model::FetchResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OneShotFetcher {
        html: String,
        hits: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for OneShotFetcher {
        async fn fetch(&self, url: &str, _user_agent: &str, _timeout: Duration) -> WebFluxResult<FetchResult> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if url.ends_with("robots.txt") {
                return Ok(FetchResult {
                    status: 404,
                    body: Vec::new(),
                    declared_content_type: None,
                    effective_url: url.to_string(),
                    response_time: Duration::from_millis(1),
                    size: 0,
                    retry_after: None,
                });
            }
            Ok(FetchResult {
                status: 200,
                body: self.html.clone().into_bytes(),
                declared_content_type: Some("text/html".to_string()),
                effective_url: url.to_string(),
                response_time: Duration::from_millis(1),
                size: self.html.len(),
                retry_after: None,
            })
        }
    }

    fn make_orchestrator(fetcher: Arc<OneShotFetcher>) -> Orchestrator<OneShotFetcher> {
        Orchestrator {
            fetcher: fetcher.clone(),
            policy: Arc::new(PolicyCache::new(fetcher, "WebFlux/0.1")),
            rate_limiter: Arc::new(RateLimiter::new()),
            tokens: Arc::new(TokenCounter::new()),
            events: CrawlEventBus::new(256),
            progress: Arc::new(ProgressTracker::new(1)),
            cancel: Cancellation::new(),
            completion: None,
            embeddings: None,
            chunking: Arc::new(ChunkingRegistry::with_defaults()),
        }
    }

    #[tokio::test]
    async fn single_page_crawl_produces_chunks() {
        let html = "<html><body><article><h1>Title</h1><p>Some paragraph content here.</p></article></body></html>".to_string();
        let fetcher = Arc::new(OneShotFetcher { html, hits: AtomicUsize::new(0) });
        let orchestrator = make_orchestrator(fetcher);

        let config = CrawlConfigBuilder::new().seed_url("https://example.com/a").worker_count(2).build();
        let reconstruct_options = ReconstructOptionsBuilder::new().strategy("None").build();
        let chunking_params: ChunkingParams = (&ChunkingOptionsBuilder::new().build()).into();

        let outcome = orchestrator.run("job-1", &config, &reconstruct_options, &chunking_params).await.unwrap();
        assert_eq!(outcome.urls_succeeded, 1);
        assert_eq!(outcome.urls_failed, 0);
        assert!(!outcome.chunks.is_empty());
    }

    #[tokio::test]
    async fn same_origin_crawl_discovers_and_follows_links() {
        let html = r#"<html><body><article><p>root page</p><a href="/child">child</a></article></body></html>"#.to_string();
        let fetcher = Arc::new(OneShotFetcher { html, hits: AtomicUsize::new(0) });
        let orchestrator = make_orchestrator(fetcher.clone());

        let config = CrawlConfigBuilder::new().seed_url("https://example.com/").same_origin_only(true).max_depth(2).worker_count(2).build();
        let reconstruct_options = ReconstructOptionsBuilder::new().strategy("None").build();
        let chunking_params: ChunkingParams = (&ChunkingOptionsBuilder::new().build()).into();

        let outcome = orchestrator.run("job-2", &config, &reconstruct_options, &chunking_params).await.unwrap();
        assert_eq!(outcome.urls_succeeded, 2);
    }

    #[tokio::test]
    async fn unavailable_completion_backend_pin_fails_url() {
        let html = "<html><body><article><p>short</p></article></body></html>".to_string();
        let fetcher = Arc::new(OneShotFetcher { html, hits: AtomicUsize::new(0) });
        let orchestrator = make_orchestrator(fetcher);

        let config = CrawlConfigBuilder::new().seed_url("https://example.com/a").worker_count(1).build();
        let reconstruct_options = ReconstructOptionsBuilder::new().strategy("Rewrite").build();
        let chunking_params: ChunkingParams = (&ChunkingOptionsBuilder::new().build()).into();

        let outcome = orchestrator.run("job-3", &config, &reconstruct_options, &chunking_params).await.unwrap();
        assert_eq!(outcome.urls_failed, 1);
        assert_eq!(outcome.urls_succeeded, 0);
    }

    #[tokio::test]
    async fn cancellation_stops_further_processing() {
        let html = "<html><body><article><p>content</p></article></body></html>".to_string();
        let fetcher = Arc::new(OneShotFetcher { html, hits: AtomicUsize::new(0) });
        let orchestrator = make_orchestrator(fetcher);
        orchestrator.cancel.cancel();

        let config = CrawlConfigBuilder::new().seed_url("https://example.com/a").worker_count(1).build();
        let reconstruct_options = ReconstructOptionsBuilder::new().strategy("None").build();
        let chunking_params: ChunkingParams = (&ChunkingOptionsBuilder::new().build()).into();

        let outcome = orchestrator.run("job-4", &config, &reconstruct_options, &chunking_params).await.unwrap();
        assert_eq!(outcome.urls_succeeded, 0);
        assert_eq!(outcome.urls_failed, 0);
    }

    #[allow(unused)]
    fn assert_fetcher_is_fetcher() {
        fn needs_fetcher<T: Fetcher>() {}
        needs_fetcher::<ReqwestFetcher>();
        let _ = NoCompletionBackend;
        let _ = NoEmbeddingBackend;
    }
}
