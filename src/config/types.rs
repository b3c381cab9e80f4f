//! Configuration types for the crawl, reconstruct, and chunking stages.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for a crawl job.
///
/// Constructed via [`CrawlConfigBuilder`](super::builder::CrawlConfigBuilder);
/// fields are `pub(crate)` with public getters, following the same shape the
/// rest of this crate uses for every configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfiguration {
    pub(crate) seed_urls: Vec<String>,
    pub(crate) max_depth: u32,
    pub(crate) max_urls: Option<usize>,
    pub(crate) allow_patterns: Vec<String>,
    pub(crate) deny_patterns: Vec<String>,
    pub(crate) same_origin_only: bool,
    pub(crate) user_agent: String,
    pub(crate) per_host_concurrency: usize,
    pub(crate) worker_count: usize,
    pub(crate) fetch_timeout: Duration,
    pub(crate) default_crawl_delay: Duration,
    pub(crate) retry_budget: u32,
    pub(crate) job_timeout: Option<Duration>,
    pub(crate) grace_period: Duration,
}

impl Default for CrawlConfiguration {
    fn default() -> Self {
        Self {
            seed_urls: Vec::new(),
            max_depth: 5,
            max_urls: None,
            allow_patterns: Vec::new(),
            deny_patterns: Vec::new(),
            same_origin_only: false,
            user_agent: "WebFlux/0.1".to_string(),
            per_host_concurrency: 2,
            worker_count: 8,
            fetch_timeout: Duration::from_secs(30),
            default_crawl_delay: Duration::from_millis(0),
            retry_budget: 5,
            job_timeout: None,
            grace_period: Duration::from_secs(5),
        }
    }
}

/// Named reconstruct strategy selection plus per-variant parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructOptions {
    pub(crate) strategy: String,
    pub(crate) use_llm: bool,
    pub(crate) parameters: std::collections::HashMap<String, String>,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            strategy: "Auto".to_string(),
            use_llm: true,
            parameters: std::collections::HashMap::new(),
        }
    }
}

/// Chunking options shared across strategies plus a strategy-specific map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingOptions {
    pub(crate) max_chunk_size: usize,
    pub(crate) min_chunk_size: usize,
    pub(crate) overlap: usize,
    pub(crate) strategy: Option<String>,
    pub(crate) strategy_options: std::collections::HashMap<String, String>,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 2000,
            min_chunk_size: 100,
            overlap: 200,
            strategy: None,
            strategy_options: std::collections::HashMap::new(),
        }
    }
}
