//! Event bus counters, ported from `crawl_events::metrics`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct EventBusMetrics {
    events_published: AtomicU64,
    events_dropped: AtomicU64,
    events_failed: AtomicU64,
    active_subscribers: AtomicUsize,
    peak_subscribers: AtomicUsize,
}

impl EventBusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_subscriber_count(&self, count: usize) {
        self.active_subscribers.store(count, Ordering::Relaxed);
        self.peak_subscribers.fetch_max(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_published: self.events_published.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            active_subscribers: self.active_subscribers.load(Ordering::Relaxed),
            peak_subscribers: self.peak_subscribers.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.events_published.store(0, Ordering::Relaxed);
        self.events_dropped.store(0, Ordering::Relaxed);
        self.events_failed.store(0, Ordering::Relaxed);
        self.peak_subscribers.store(self.active_subscribers.load(Ordering::Relaxed), Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub events_published: u64,
    pub events_dropped: u64,
    pub events_failed: u64,
    pub active_subscribers: usize,
    pub peak_subscribers: usize,
}

impl MetricsSnapshot {
    pub fn total_events(&self) -> u64 {
        self.events_published + self.events_dropped + self.events_failed
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total_events();
        if total == 0 {
            100.0
        } else {
            (self.events_published as f64 / total as f64) * 100.0
        }
    }
}
