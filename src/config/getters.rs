//! Accessor methods for the configuration types.

use std::time::Duration;

use super::types::{ChunkingOptions, CrawlConfiguration, ReconstructOptions};

impl CrawlConfiguration {
    pub fn seed_urls(&self) -> &[String] {
        &self.seed_urls
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_urls(&self) -> Option<usize> {
        self.max_urls
    }

    pub fn allow_patterns(&self) -> &[String] {
        &self.allow_patterns
    }

    pub fn deny_patterns(&self) -> &[String] {
        &self.deny_patterns
    }

    pub fn same_origin_only(&self) -> bool {
        self.same_origin_only
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn per_host_concurrency(&self) -> usize {
        self.per_host_concurrency
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn default_crawl_delay(&self) -> Duration {
        self.default_crawl_delay
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }
}

impl ChunkingOptions {
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn min_chunk_size(&self) -> usize {
        self.min_chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn strategy(&self) -> Option<&str> {
        self.strategy.as_deref()
    }

    pub fn strategy_options(&self) -> &std::collections::HashMap<String, String> {
        &self.strategy_options
    }
}

impl ReconstructOptions {
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn use_llm(&self) -> bool {
        self.use_llm
    }

    pub fn parameters(&self) -> &std::collections::HashMap<String, String> {
        &self.parameters
    }
}
