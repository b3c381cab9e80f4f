//! The crawl event taxonomy: a tagged sum type whose variant name is the
//! stable, wire-visible tag the bus keys subscriptions by.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShutdownReason {
    CrawlCompleted,
    Error(String),
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrawlEvent {
    CrawlStarted { job_id: String, seed_urls: Vec<String>, max_depth: u32, timestamp: DateTime<Utc> },
    UrlProcessingStarted { url: String, depth: u32, timestamp: DateTime<Utc> },
    UrlProcessed { url: String, chunk_count: usize, response_time_ms: u64, timestamp: DateTime<Utc> },
    UrlProcessingFailed { url: String, error_type: String, message: String, status: Option<u16>, retries: u32, timestamp: DateTime<Utc> },
    CrawlCompleted { total_urls: usize, total_chunks: usize, duration_ms: u64, timestamp: DateTime<Utc> },
    CrawlError { message: String, timestamp: DateTime<Utc> },
    CrawlWarning { message: String, timestamp: DateTime<Utc> },
    Shutdown { reason: ShutdownReason, timestamp: DateTime<Utc> },
}

impl CrawlEvent {
    pub fn crawl_started(job_id: impl Into<String>, seed_urls: Vec<String>, max_depth: u32) -> Self {
        CrawlEvent::CrawlStarted { job_id: job_id.into(), seed_urls, max_depth, timestamp: Utc::now() }
    }

    pub fn url_processing_started(url: impl Into<String>, depth: u32) -> Self {
        CrawlEvent::UrlProcessingStarted { url: url.into(), depth, timestamp: Utc::now() }
    }

    pub fn url_processed(url: impl Into<String>, chunk_count: usize, response_time_ms: u64) -> Self {
        CrawlEvent::UrlProcessed { url: url.into(), chunk_count, response_time_ms, timestamp: Utc::now() }
    }

    pub fn url_processing_failed(url: impl Into<String>, error_type: impl Into<String>, message: impl Into<String>, status: Option<u16>, retries: u32) -> Self {
        CrawlEvent::UrlProcessingFailed { url: url.into(), error_type: error_type.into(), message: message.into(), status, retries, timestamp: Utc::now() }
    }

    pub fn crawl_completed(total_urls: usize, total_chunks: usize, duration_ms: u64) -> Self {
        CrawlEvent::CrawlCompleted { total_urls, total_chunks, duration_ms, timestamp: Utc::now() }
    }

    pub fn crawl_error(message: impl Into<String>) -> Self {
        CrawlEvent::CrawlError { message: message.into(), timestamp: Utc::now() }
    }

    pub fn crawl_warning(message: impl Into<String>) -> Self {
        CrawlEvent::CrawlWarning { message: message.into(), timestamp: Utc::now() }
    }

    pub fn shutdown(reason: ShutdownReason) -> Self {
        CrawlEvent::Shutdown { reason, timestamp: Utc::now() }
    }

    /// The stable wire tag for this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            CrawlEvent::CrawlStarted { .. } => "CrawlStarted",
            CrawlEvent::UrlProcessingStarted { .. } => "UrlProcessingStarted",
            CrawlEvent::UrlProcessed { .. } => "UrlProcessed",
            CrawlEvent::UrlProcessingFailed { .. } => "UrlProcessingFailed",
            CrawlEvent::CrawlCompleted { .. } => "CrawlCompleted",
            CrawlEvent::CrawlError { .. } => "CrawlError",
            CrawlEvent::CrawlWarning { .. } => "CrawlWarning",
            CrawlEvent::Shutdown { .. } => "Shutdown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPublishResult {
    pub total: usize,
    pub published: usize,
    pub failed: usize,
    pub max_subscribers: usize,
}

impl BatchPublishResult {
    pub fn is_complete(&self) -> bool {
        self.published == self.total
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.published as f64 / self.total as f64) * 100.0
        }
    }
}
