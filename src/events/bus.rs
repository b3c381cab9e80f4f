//! The crawl event bus: a broadcast channel with configurable backpressure,
//! metrics, graceful shutdown, and filtered/batched publication.
//!
//! Ported nearly verbatim from `crawl_events::bus::CrawlEventBus`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, Notify};

use super::config::{BackpressureMode, EventBusConfig};
use super::errors::EventBusError;
use super::metrics::{EventBusMetrics, MetricsSnapshot};
use super::streaming::FilteredReceiver;
use super::types::{BatchPublishResult, CrawlEvent, ShutdownReason};

const BLOCK_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_CONSECUTIVE_TIMEOUTS: usize = 10;
const SHUTDOWN_DRAIN_MS: u64 = 500;

/// A broadcast event bus for crawl lifecycle events.
///
/// Clones share the same underlying channel; the bus shuts itself down only
/// when the last live clone is dropped, mirroring `broadcast::Sender`'s own
/// reference-counting.
pub struct CrawlEventBus {
    sender: broadcast::Sender<CrawlEvent>,
    config: Arc<EventBusConfig>,
    metrics: Arc<EventBusMetrics>,
    shutdown: Arc<Notify>,
    shutdown_flag: Arc<AtomicBool>,
    capacity_notify: Arc<Notify>,
    send_lock: Arc<Mutex<()>>,
    consecutive_timeouts: Arc<AtomicUsize>,
    num_instances: Arc<AtomicUsize>,
}

impl CrawlEventBus {
    pub fn new(capacity: usize) -> Self {
        Self::with_config(EventBusConfig::default().with_capacity(capacity))
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self {
            sender,
            config: Arc::new(config),
            metrics: Arc::new(EventBusMetrics::new()),
            shutdown: Arc::new(Notify::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            capacity_notify: Arc::new(Notify::new()),
            send_lock: Arc::new(Mutex::new(())),
            consecutive_timeouts: Arc::new(AtomicUsize::new(0)),
            num_instances: Arc::new(AtomicUsize::new(1)),
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Publishes with the bus's configured backpressure mode.
    pub async fn publish(&self, event: CrawlEvent) -> Result<usize, EventBusError> {
        self.publish_with_backpressure(event).await
    }

    pub async fn publish_with_backpressure(&self, event: CrawlEvent) -> Result<usize, EventBusError> {
        if self.shutdown_flag.load(Ordering::SeqCst) {
            return Err(EventBusError::Shutdown);
        }

        match self.config.backpressure_mode {
            BackpressureMode::DropOldest => self.send_now(event),
            BackpressureMode::Block => self.publish_blocking(event).await,
            BackpressureMode::Error => self.publish_or_error(event).await,
        }
    }

    fn send_now(&self, event: CrawlEvent) -> Result<usize, EventBusError> {
        match self.sender.send(event) {
            Ok(n) => {
                self.metrics.record_published();
                self.metrics.set_subscriber_count(n);
                Ok(n)
            }
            Err(_) => {
                self.metrics.record_dropped();
                Err(EventBusError::NoSubscribers)
            }
        }
    }

    async fn publish_blocking(&self, event: CrawlEvent) -> Result<usize, EventBusError> {
        if self.is_overloaded() {
            let wait = tokio::time::timeout(BLOCK_PUBLISH_TIMEOUT, self.capacity_notify.notified()).await;
            if wait.is_err() {
                let timeouts = self.consecutive_timeouts.fetch_add(1, Ordering::SeqCst) + 1;
                if timeouts >= MAX_CONSECUTIVE_TIMEOUTS {
                    // circuit breaker: degrade to DropOldest rather than stall forever
                    self.consecutive_timeouts.store(0, Ordering::SeqCst);
                    return self.send_now(event);
                }
                self.metrics.record_failed();
                return Err(EventBusError::PublishTimeout);
            }
        }
        self.consecutive_timeouts.store(0, Ordering::SeqCst);
        let result = self.send_now(event);
        self.capacity_notify.notify_waiters();
        result
    }

    async fn publish_or_error(&self, event: CrawlEvent) -> Result<usize, EventBusError> {
        let _guard = self.send_lock.lock().await;
        if self.is_overloaded() {
            self.metrics.record_failed();
            return Err(EventBusError::ChannelFull);
        }
        self.send_now(event)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        let receiver = self.sender.subscribe();
        self.metrics.set_subscriber_count(self.subscriber_count());
        receiver
    }

    pub fn subscribe_filtered<F>(&self, filter: F) -> FilteredReceiver<F>
    where
        F: Fn(&CrawlEvent) -> bool + Send + Sync + 'static,
    {
        FilteredReceiver::new(self.subscribe(), filter)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    pub fn buffer_len(&self) -> usize {
        self.sender.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.config.capacity.saturating_sub(self.buffer_len())
    }

    pub fn pressure(&self) -> f64 {
        self.buffer_len() as f64 / self.config.capacity.max(1) as f64
    }

    pub fn is_overloaded(&self) -> bool {
        self.pressure() >= self.config.overload_threshold
    }

    /// Best-effort publish of a batch: failures are counted, not propagated.
    pub async fn publish_batch(&self, events: Vec<CrawlEvent>) -> BatchPublishResult {
        let total = events.len();
        let mut published = 0;
        let mut failed = 0;
        let mut max_subscribers = 0;
        for event in events {
            match self.publish_with_backpressure(event).await {
                Ok(n) => {
                    published += 1;
                    max_subscribers = max_subscribers.max(n);
                }
                Err(_) => failed += 1,
            }
        }
        BatchPublishResult { total, published, failed, max_subscribers }
    }

    pub fn get_metrics_report(&self) -> String {
        let m = self.metrics();
        format!(
            "published={} dropped={} failed={} subscribers={} peak_subscribers={} success_rate={:.1}%",
            m.events_published, m.events_dropped, m.events_failed, m.active_subscribers, m.peak_subscribers, m.success_rate()
        )
    }

    /// Idempotent: flips the shutdown flag and wakes all waiters once.
    pub fn shutdown(&self) {
        if !self.shutdown_flag.swap(true, Ordering::SeqCst) {
            self.shutdown.notify_waiters();
        }
    }

    pub async fn wait_for_shutdown(&self) {
        if self.shutdown_flag.load(Ordering::SeqCst) {
            return;
        }
        self.shutdown.notified().await;
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Four-phase graceful shutdown: flag, terminal event, drain window,
    /// wake waiters.
    pub async fn shutdown_gracefully(&self, reason: ShutdownReason) {
        if self.shutdown_flag.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.send_now(CrawlEvent::shutdown(reason));
        tokio::time::sleep(Duration::from_millis(SHUTDOWN_DRAIN_MS)).await;
        self.shutdown.notify_waiters();
    }
}

impl Clone for CrawlEventBus {
    fn clone(&self) -> Self {
        self.num_instances.fetch_add(1, Ordering::SeqCst);
        Self {
            sender: self.sender.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            shutdown: self.shutdown.clone(),
            shutdown_flag: self.shutdown_flag.clone(),
            capacity_notify: self.capacity_notify.clone(),
            send_lock: self.send_lock.clone(),
            consecutive_timeouts: self.consecutive_timeouts.clone(),
            num_instances: self.num_instances.clone(),
        }
    }
}

impl Drop for CrawlEventBus {
    fn drop(&mut self) {
        if self.num_instances.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_errors() {
        let bus = CrawlEventBus::new(16);
        let result = bus.publish(CrawlEvent::crawl_started("job-1", vec!["https://a.test".into()], 3)).await;
        assert!(matches!(result, Err(EventBusError::NoSubscribers)));
    }

    #[tokio::test]
    async fn subscribe_then_publish_delivers() {
        let bus = CrawlEventBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish(CrawlEvent::crawl_started("job-1", vec!["https://a.test".into()], 3)).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.tag(), "CrawlStarted");
        assert_eq!(bus.metrics().events_published, 1);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_observable() {
        let bus = CrawlEventBus::new(16);
        bus.shutdown();
        bus.shutdown();
        assert!(bus.is_shutdown());
        let result = bus.publish(CrawlEvent::crawl_error("boom")).await;
        assert!(matches!(result, Err(EventBusError::Shutdown)));
    }

    #[tokio::test]
    async fn drop_of_last_instance_triggers_shutdown() {
        let bus = CrawlEventBus::new(16);
        let clone = bus.clone();
        drop(bus);
        assert!(!clone.is_shutdown());
        drop(clone);
    }

    #[tokio::test]
    async fn filtered_receiver_skips_non_matching_events() {
        let bus = CrawlEventBus::new(16);
        let mut filtered = bus.subscribe_filtered(|e| matches!(e, CrawlEvent::CrawlWarning { .. }));
        bus.publish(CrawlEvent::crawl_error("not a warning")).await.unwrap();
        bus.publish(CrawlEvent::crawl_warning("a warning")).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(1), filtered.recv()).await.unwrap().unwrap();
        assert!(matches!(event, CrawlEvent::CrawlWarning { .. }));
    }
}
