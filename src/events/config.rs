//! Event bus tuning knobs, ported from `crawl_events::config`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackpressureMode {
    /// Evict the oldest buffered event to make room (default broadcast behavior).
    DropOldest,
    /// Wait for buffer headroom, up to a timeout, before publishing.
    Block,
    /// Fail the publish immediately instead of waiting or dropping.
    Error,
}

impl Default for BackpressureMode {
    fn default() -> Self {
        BackpressureMode::DropOldest
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    pub capacity: usize,
    pub backpressure_mode: BackpressureMode,
    pub overload_threshold: f64,
    pub enable_batching: bool,
    pub max_batch_size: usize,
    pub batch_timeout_ms: u64,
    pub enable_metrics: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            backpressure_mode: BackpressureMode::default(),
            overload_threshold: 0.8,
            enable_batching: false,
            max_batch_size: 100,
            batch_timeout_ms: 100,
            enable_metrics: true,
        }
    }
}

impl EventBusConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_backpressure_mode(mut self, mode: BackpressureMode) -> Self {
        self.backpressure_mode = mode;
        self
    }

    pub fn with_overload_threshold(mut self, threshold: f64) -> Self {
        self.overload_threshold = threshold;
        self
    }
}
