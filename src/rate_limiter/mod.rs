//! Rate Limiter: per-host crawl-delay, request-rate, and visit-time
//! enforcement.
//!
//! The token-bucket primitive (`DomainRateLimiter`, `pack_state`/
//! `unpack_state`, cache-line-aligned atomics) is carried over directly from
//! `crawl_engine::rate_limiter`; it now backs request-rate enforcement while
//! a separate per-host last-fetch timestamp enforces the minimum
//! crawl-delay gap (I4).

use std::sync::atomic::{AtomicU128, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::cancel::Cancellation;
use crate::error::WebFluxError;
use crate::policy::{RequestRate, VisitTimeWindow};

const TOKEN_SCALE: u64 = 1000;
const RATE_SCALE: u64 = 1_000_000;

#[inline(always)]
fn pack_state(tokens: u64, last_refill_nanos: u64) -> u128 {
    ((tokens as u128) << 64) | (last_refill_nanos as u128)
}

#[inline(always)]
fn unpack_state(packed: u128) -> (u64, u64) {
    let tokens = (packed >> 64) as u64;
    let last_refill_nanos = (packed & 0xFFFF_FFFF_FFFF_FFFF) as u64;
    (tokens, last_refill_nanos)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allow,
    Deny { retry_after: Duration },
}

#[repr(C, align(64))]
struct DomainRateLimiter {
    state: AtomicU128,
    rate_per_nano: u64,
    max_tokens: u64,
    _padding: [u8; 32],
}

impl DomainRateLimiter {
    fn new(rate_per_sec: f64, base_time: &Instant) -> Self {
        let max_tokens = (rate_per_sec.max(1.0) * TOKEN_SCALE as f64) as u64;
        let rate_per_nano = ((rate_per_sec * TOKEN_SCALE as f64 * RATE_SCALE as f64) / 1_000_000_000.0) as u64;
        let now_nanos = base_time.elapsed().as_nanos() as u64;
        Self { state: AtomicU128::new(pack_state(max_tokens, now_nanos)), rate_per_nano, max_tokens, _padding: [0u8; 32] }
    }

    fn refill(&self, now_nanos: u64) {
        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            let (tokens, last_refill) = unpack_state(current);
            if now_nanos <= last_refill {
                return;
            }
            let elapsed = now_nanos.saturating_sub(last_refill);
            let tokens_to_add = (elapsed.saturating_mul(self.rate_per_nano)) / RATE_SCALE;
            let time_credited = if self.rate_per_nano > 0 { (tokens_to_add.saturating_mul(RATE_SCALE)) / self.rate_per_nano } else { 0 };
            let new_last_refill = last_refill.saturating_add(time_credited);
            let new_tokens = if tokens_to_add > 0 { tokens.saturating_add(tokens_to_add).min(self.max_tokens) } else { tokens };
            let new_state = pack_state(new_tokens, new_last_refill);
            match self.state.compare_exchange_weak(current, new_state, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return,
                Err(actual) => {
                    current = actual;
                    std::hint::spin_loop();
                }
            }
        }
    }

    fn try_consume(&self, base_time: &Instant) -> RateLimitDecision {
        let now_nanos = base_time.elapsed().as_nanos() as u64;
        self.refill(now_nanos);

        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            let (tokens, last_refill) = unpack_state(current);
            if tokens < TOKEN_SCALE {
                let needed = TOKEN_SCALE.saturating_sub(tokens);
                let nanos_needed = if self.rate_per_nano > 0 { (needed.saturating_mul(RATE_SCALE)) / self.rate_per_nano } else { 1_000_000 };
                return RateLimitDecision::Deny { retry_after: Duration::from_nanos(nanos_needed) };
            }
            let new_tokens = tokens - TOKEN_SCALE;
            let new_state = pack_state(new_tokens, last_refill);
            match self.state.compare_exchange_weak(current, new_state, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return RateLimitDecision::Allow,
                Err(actual) => {
                    current = actual;
                    std::hint::spin_loop();
                }
            }
        }
    }
}

/// Effective policy for one host, combining the configured default with
/// whatever the robots policy specified.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    pub crawl_delay: Duration,
    pub request_rate: Option<RequestRate>,
    pub visit_time: Option<VisitTimeWindow>,
    pub defer_outside_visit_time: bool,
}

impl HostPolicy {
    pub fn new(robots_crawl_delay: Option<f64>, configured_default: Duration) -> Self {
        let delay = robots_crawl_delay.map(Duration::from_secs_f64).unwrap_or(Duration::ZERO).max(configured_default);
        Self { crawl_delay: delay, request_rate: None, visit_time: None, defer_outside_visit_time: true }
    }

    pub fn with_request_rate(mut self, rate: Option<RequestRate>) -> Self {
        self.request_rate = rate;
        self
    }

    pub fn with_visit_time(mut self, window: Option<VisitTimeWindow>) -> Self {
        self.visit_time = window;
        self
    }
}

fn minutes_since_midnight_utc() -> u32 {
    let now = chrono::Utc::now();
    use chrono::Timelike;
    now.hour() * 60 + now.minute()
}

fn within_visit_window(window: &VisitTimeWindow) -> bool {
    let now = minutes_since_midnight_utc();
    if window.start_minute_utc <= window.end_minute_utc {
        (window.start_minute_utc..window.end_minute_utc).contains(&now)
    } else {
        now >= window.start_minute_utc || now < window.end_minute_utc
    }
}

/// Per-host rate limiter enforcing crawl-delay, request-rate, and
/// visit-time, independent across hosts.
pub struct RateLimiter {
    last_fetch: DashMap<String, Arc<Mutex<Option<Instant>>>>,
    buckets: DashMap<String, Arc<DomainRateLimiter>>,
    base_time: Instant,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { last_fetch: DashMap::new(), buckets: DashMap::new(), base_time: Instant::now() }
    }

    /// Block until `host` may be fetched under `policy`, or return
    /// `Cancelled` if `cancel` fires first.
    pub async fn acquire(&self, host: &str, policy: &HostPolicy, cancel: &Cancellation) -> Result<(), WebFluxError> {
        if let Some(window) = &policy.visit_time {
            while !within_visit_window(window) {
                if !policy.defer_outside_visit_time {
                    return Err(WebFluxError::QuotaExceeded(format!("{host} outside visit-time window")));
                }
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(30)) => {},
                    _ = cancel.cancelled() => return Err(WebFluxError::Cancelled),
                }
            }
        }

        let slot = self.last_fetch.entry(host.to_string()).or_insert_with(|| Arc::new(Mutex::new(None))).clone();
        {
            let mut guard = slot.lock().await;
            if let Some(last) = *guard {
                let elapsed = last.elapsed();
                if elapsed < policy.crawl_delay {
                    tokio::select! {
                        _ = tokio::time::sleep(policy.crawl_delay - elapsed) => {},
                        _ = cancel.cancelled() => return Err(WebFluxError::Cancelled),
                    }
                }
            }
            *guard = Some(Instant::now());
        }

        if let Some(rate) = &policy.request_rate {
            let rate_per_sec = rate.requests as f64 / rate.window_secs.max(1) as f64;
            let limiter = self
                .buckets
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(DomainRateLimiter::new(rate_per_sec, &self.base_time)))
                .clone();
            loop {
                match limiter.try_consume(&self.base_time) {
                    RateLimitDecision::Allow => break,
                    RateLimitDecision::Deny { retry_after } => {
                        tokio::select! {
                            _ = tokio::time::sleep(retry_after) => {},
                            _ = cancel.cancelled() => return Err(WebFluxError::Cancelled),
                        }
                    }
                }
            }
        }

        Ok(())
    }

    pub fn tracked_host_count(&self) -> usize {
        self.last_fetch.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successive_fetches_respect_crawl_delay() {
        let limiter = RateLimiter::new();
        let policy = HostPolicy::new(Some(0.05), Duration::ZERO);
        let cancel = Cancellation::new();

        let start = Instant::now();
        limiter.acquire("example.com", &policy, &cancel).await.unwrap();
        limiter.acquire("example.com", &policy, &cancel).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn independent_hosts_do_not_block_each_other() {
        let limiter = RateLimiter::new();
        let policy = HostPolicy::new(Some(1.0), Duration::ZERO);
        let cancel = Cancellation::new();

        limiter.acquire("a.example.com", &policy, &cancel).await.unwrap();
        let start = Instant::now();
        limiter.acquire("b.example.com", &policy, &cancel).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn cancellation_interrupts_wait() {
        let limiter = RateLimiter::new();
        let policy = HostPolicy::new(Some(10.0), Duration::ZERO);
        let cancel = Cancellation::new();

        limiter.acquire("slow.example.com", &policy, &cancel).await.unwrap();
        cancel.cancel();
        let result = limiter.acquire("slow.example.com", &policy, &cancel).await;
        assert!(matches!(result, Err(WebFluxError::Cancelled)));
    }
}
