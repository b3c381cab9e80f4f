//! Progress Tracker: per-job counters, ETA, and a broadcast channel of
//! snapshots.
//!
//! Single-mutex-per-job guarding, grounded on the concurrency model's
//! "per-job state is guarded by a single mutex per job; concurrent readers
//! of a progress snapshot receive an immutable deep copy" rule.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::broadcast;

use super::snapshot::{ErrorEntry, ProgressSnapshot, ResponseTimeStats};

const DEFAULT_MAX_ERRORS: usize = 1000;
const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
        .unwrap_or_else(|| url.to_string())
}

struct TrackerState {
    total: usize,
    processed: usize,
    success: usize,
    failure: usize,
    total_chunks: usize,
    current_url: Option<String>,
    errors: VecDeque<ErrorEntry>,
    per_domain: HashMap<String, usize>,
    per_status: HashMap<u16, usize>,
    per_content_type: HashMap<String, usize>,
    per_error_type: HashMap<String, usize>,
    response_time_min: Option<Duration>,
    response_time_max: Option<Duration>,
    response_time_sum: Duration,
    response_time_count: u32,
}

impl TrackerState {
    fn record_response_time(&mut self, rt: Duration) {
        self.response_time_min = Some(self.response_time_min.map_or(rt, |m| m.min(rt)));
        self.response_time_max = Some(self.response_time_max.map_or(rt, |m| m.max(rt)));
        self.response_time_sum += rt;
        self.response_time_count += 1;
    }

    fn response_time_stats(&self) -> ResponseTimeStats {
        let avg = if self.response_time_count > 0 {
            self.response_time_sum / self.response_time_count
        } else {
            Duration::ZERO
        };
        ResponseTimeStats { min: self.response_time_min.unwrap_or_default(), max: self.response_time_max.unwrap_or_default(), avg }
    }

    fn push_error(&mut self, entry: ErrorEntry, max_errors: usize) {
        self.errors.push_back(entry);
        while self.errors.len() > max_errors {
            self.errors.pop_front();
        }
    }
}

/// Per-job progress tracker. Every mutating call recomputes timings and
/// publishes a fresh snapshot to subscribers.
pub struct ProgressTracker {
    state: Mutex<TrackerState>,
    sender: Mutex<Option<broadcast::Sender<ProgressSnapshot>>>,
    started_at: Instant,
    started_at_utc: chrono::DateTime<Utc>,
    closed: Arc<AtomicBool>,
    max_errors: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        let (sender, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(TrackerState {
                total,
                processed: 0,
                success: 0,
                failure: 0,
                total_chunks: 0,
                current_url: None,
                errors: VecDeque::new(),
                per_domain: HashMap::new(),
                per_status: HashMap::new(),
                per_content_type: HashMap::new(),
                per_error_type: HashMap::new(),
                response_time_min: None,
                response_time_max: None,
                response_time_sum: Duration::ZERO,
                response_time_count: 0,
            }),
            sender: Mutex::new(Some(sender)),
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            closed: Arc::new(AtomicBool::new(false)),
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }

    /// Subscribes to this job's snapshot stream. Once the tracker has
    /// closed, the returned receiver is already closed: `recv()` resolves
    /// immediately with `RecvError::Closed` rather than blocking forever.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressSnapshot> {
        let sender = self.sender.lock().expect("progress tracker mutex poisoned");
        match sender.as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (closed_sender, receiver) = broadcast::channel(1);
                drop(closed_sender);
                receiver
            }
        }
    }

    pub fn start_url(&self, url: &str) {
        let mut state = self.state.lock().expect("progress tracker mutex poisoned");
        state.current_url = Some(url.to_string());
        drop(state);
        self.publish();
    }

    #[allow(clippy::too_many_arguments)]
    pub fn complete_url(&self, url: &str, chunk_count: usize, response_time: Duration, status: u16, content_type: Option<&str>) {
        let mut state = self.state.lock().expect("progress tracker mutex poisoned");
        state.processed += 1;
        state.success += 1;
        state.total_chunks += chunk_count;
        *state.per_domain.entry(domain_of(url)).or_insert(0) += 1;
        *state.per_status.entry(status).or_insert(0) += 1;
        if let Some(ct) = content_type {
            *state.per_content_type.entry(ct.to_string()).or_insert(0) += 1;
        }
        state.record_response_time(response_time);
        drop(state);
        self.publish();
        self.maybe_close();
    }

    pub fn fail_url(&self, url: &str, error_type: &str, message: &str, status: Option<u16>, retries: u32) {
        let mut state = self.state.lock().expect("progress tracker mutex poisoned");
        state.processed += 1;
        state.failure += 1;
        *state.per_error_type.entry(error_type.to_string()).or_insert(0) += 1;
        if let Some(status) = status {
            *state.per_status.entry(status).or_insert(0) += 1;
        }
        let max_errors = self.max_errors;
        state.push_error(
            ErrorEntry { url: url.to_string(), error_type: error_type.to_string(), message: message.to_string(), status, retries, time: Utc::now() },
            max_errors,
        );
        drop(state);
        self.publish();
        self.maybe_close();
    }

    pub fn complete(&self) {
        self.publish();
        self.close();
    }

    pub fn cancel(&self, _reason: &str) {
        self.publish();
        self.close();
    }

    fn maybe_close(&self) {
        let state = self.state.lock().expect("progress tracker mutex poisoned");
        if state.processed >= state.total {
            drop(state);
            self.close();
        }
    }

    /// Closes the snapshot channel exactly once, dropping the tracker's
    /// retained sender so every existing subscriber's `recv()` resolves
    /// with `RecvError::Closed` instead of blocking past completion.
    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.sender.lock().expect("progress tracker mutex poisoned").take();
        }
    }

    fn publish(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        if let Some(sender) = self.sender.lock().expect("progress tracker mutex poisoned").as_ref() {
            let _ = sender.send(self.snapshot());
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state.lock().expect("progress tracker mutex poisoned");
        let elapsed = self.started_at.elapsed();
        let estimated_remaining = if state.processed > 0 && state.processed < state.total {
            let per_item = elapsed.as_secs_f64() / state.processed as f64;
            Some(Duration::from_secs_f64(per_item * (state.total - state.processed) as f64))
        } else {
            None
        };

        ProgressSnapshot {
            total: state.total,
            processed: state.processed,
            success: state.success,
            failure: state.failure,
            total_chunks: state.total_chunks,
            current_url: state.current_url.clone(),
            elapsed,
            estimated_remaining,
            errors: state.errors.iter().cloned().collect(),
            per_domain: state.per_domain.clone(),
            per_status: state.per_status.clone(),
            per_content_type: state.per_content_type.clone(),
            per_error_type: state.per_error_type.clone(),
            response_time: state.response_time_stats(),
            started_at: self.started_at_utc,
            last_updated: Utc::now(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processed_equals_success_plus_failure() {
        let tracker = ProgressTracker::new(3);
        tracker.complete_url("https://a.test/1", 2, Duration::from_millis(10), 200, Some("text/html"));
        tracker.fail_url("https://a.test/2", "NetworkPermanent", "404", Some(404), 0);
        let snap = tracker.snapshot();
        assert_eq!(snap.processed, snap.success + snap.failure);
        assert!(snap.processed <= snap.total);
    }

    #[test]
    fn closes_when_total_reached() {
        let tracker = ProgressTracker::new(1);
        tracker.complete_url("https://a.test/1", 0, Duration::from_millis(1), 200, None);
        assert!(tracker.is_closed());
    }

    #[tokio::test]
    async fn close_actually_closes_subscriber_channel() {
        let tracker = ProgressTracker::new(1);
        let mut receiver = tracker.subscribe();
        tracker.complete_url("https://a.test/1", 0, Duration::from_millis(1), 200, None);

        loop {
            match receiver.recv().await {
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }

        assert!(matches!(tracker.subscribe().recv().await, Err(broadcast::error::RecvError::Closed)));
    }

    #[test]
    fn error_list_is_bounded() {
        let tracker = ProgressTracker::new(2000);
        for i in 0..1500 {
            tracker.fail_url(&format!("https://a.test/{i}"), "NetworkTransient", "timeout", None, 0);
        }
        assert!(tracker.snapshot().errors.len() <= DEFAULT_MAX_ERRORS);
    }
}
