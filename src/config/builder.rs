//! Builders for the crate's configuration structs.
//!
//! Follows the teacher's builder-with-getters convention but without the
//! typestate machinery: none of `CrawlConfiguration`'s fields are mandatory
//! (an empty seed list is simply an empty job), so a plain `Default`-seeded
//! builder is sufficient here.

use std::time::Duration;

use super::types::{ChunkingOptions, CrawlConfiguration, ReconstructOptions};

#[derive(Debug, Default)]
pub struct CrawlConfigBuilder {
    inner: CrawlConfiguration,
}

impl CrawlConfigBuilder {
    pub fn new() -> Self {
        Self { inner: CrawlConfiguration::default() }
    }

    pub fn seed_url(mut self, url: impl Into<String>) -> Self {
        self.inner.seed_urls.push(url.into());
        self
    }

    pub fn seed_urls(mut self, urls: impl IntoIterator<Item = String>) -> Self {
        self.inner.seed_urls.extend(urls);
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.inner.max_depth = depth;
        self
    }

    pub fn max_urls(mut self, max: usize) -> Self {
        self.inner.max_urls = Some(max);
        self
    }

    pub fn allow_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.inner.allow_patterns.push(pattern.into());
        self
    }

    pub fn deny_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.inner.deny_patterns.push(pattern.into());
        self
    }

    pub fn same_origin_only(mut self, value: bool) -> Self {
        self.inner.same_origin_only = value;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.inner.user_agent = ua.into();
        self
    }

    pub fn per_host_concurrency(mut self, n: usize) -> Self {
        self.inner.per_host_concurrency = n;
        self
    }

    pub fn worker_count(mut self, n: usize) -> Self {
        self.inner.worker_count = n;
        self
    }

    pub fn fetch_timeout(mut self, d: Duration) -> Self {
        self.inner.fetch_timeout = d;
        self
    }

    pub fn default_crawl_delay(mut self, d: Duration) -> Self {
        self.inner.default_crawl_delay = d;
        self
    }

    pub fn retry_budget(mut self, n: u32) -> Self {
        self.inner.retry_budget = n;
        self
    }

    pub fn job_timeout(mut self, d: Duration) -> Self {
        self.inner.job_timeout = Some(d);
        self
    }

    pub fn grace_period(mut self, d: Duration) -> Self {
        self.inner.grace_period = d;
        self
    }

    pub fn build(self) -> CrawlConfiguration {
        self.inner
    }
}

#[derive(Debug, Default)]
pub struct ChunkingOptionsBuilder {
    inner: ChunkingOptions,
}

impl ChunkingOptionsBuilder {
    pub fn new() -> Self {
        Self { inner: ChunkingOptions::default() }
    }

    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.inner.max_chunk_size = size;
        self
    }

    pub fn min_chunk_size(mut self, size: usize) -> Self {
        self.inner.min_chunk_size = size;
        self
    }

    pub fn overlap(mut self, overlap: usize) -> Self {
        self.inner.overlap = overlap;
        self
    }

    pub fn strategy(mut self, name: impl Into<String>) -> Self {
        self.inner.strategy = Some(name.into());
        self
    }

    pub fn strategy_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.strategy_options.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> ChunkingOptions {
        self.inner
    }
}

#[derive(Debug, Default)]
pub struct ReconstructOptionsBuilder {
    inner: ReconstructOptions,
}

impl ReconstructOptionsBuilder {
    pub fn new() -> Self {
        Self { inner: ReconstructOptions::default() }
    }

    pub fn strategy(mut self, name: impl Into<String>) -> Self {
        self.inner.strategy = name.into();
        self
    }

    pub fn use_llm(mut self, value: bool) -> Self {
        self.inner.use_llm = value;
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.parameters.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> ReconstructOptions {
        self.inner
    }
}
