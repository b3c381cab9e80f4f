//! Progress snapshot types: the observationally-immutable deep copy handed
//! out on every tracker read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub url: String,
    pub error_type: String,
    pub message: String,
    pub status: Option<u16>,
    pub retries: u32,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub min: Duration,
    pub max: Duration,
    pub avg: Duration,
}

impl Default for ResponseTimeStats {
    fn default() -> Self {
        Self { min: Duration::ZERO, max: Duration::ZERO, avg: Duration::ZERO }
    }
}

/// A deep, observationally-immutable copy of a job's progress. Never
/// exposes the tracker's internal mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub processed: usize,
    pub success: usize,
    pub failure: usize,
    pub total_chunks: usize,
    pub current_url: Option<String>,
    pub elapsed: Duration,
    pub estimated_remaining: Option<Duration>,
    pub errors: Vec<ErrorEntry>,
    pub per_domain: HashMap<String, usize>,
    pub per_status: HashMap<u16, usize>,
    pub per_content_type: HashMap<String, usize>,
    pub per_error_type: HashMap<String, usize>,
    pub response_time: ResponseTimeStats,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ProgressSnapshot {
    pub fn new(total: usize) -> Self {
        let now = Utc::now();
        Self {
            total,
            processed: 0,
            success: 0,
            failure: 0,
            total_chunks: 0,
            current_url: None,
            elapsed: Duration::ZERO,
            estimated_remaining: None,
            errors: Vec::new(),
            per_domain: HashMap::new(),
            per_status: HashMap::new(),
            per_content_type: HashMap::new(),
            per_error_type: HashMap::new(),
            response_time: ResponseTimeStats::default(),
            started_at: now,
            last_updated: now,
        }
    }
}
