//! Per-URL retry policy: failure classification plus exponential backoff
//! with jitter, adapted from `crawl_engine::orchestrator::calculate_retry_backoff`
//! and `crawl_engine::crawl_types::FailureKind` to operate on `WebFluxError`
//! and the base-500ms/max-5-attempts parameters of this crawl's retry budget.

use std::time::Duration;

use rand::Rng;

use crate::error::WebFluxError;

const BASE_DELAY_MS: u64 = 500;
const MAX_DELAY_MS: u64 = 30_000;
const JITTER_FRACTION: f64 = 0.2;

/// Classification of a per-URL failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transient network failure: timeout, connection reset, 5xx.
    Network,
    /// 429 / explicit quota signal.
    RateLimited,
    /// 4xx other than 429, or any other non-retryable network outcome.
    Permanent,
    /// Disallowed by robots.txt.
    Policy,
    /// Extraction/parse failure.
    Content,
    /// Required capability (completion/embedding backend) absent.
    Capability,
    /// Anything else.
    Internal,
}

impl FailureKind {
    pub fn classify(error: &WebFluxError) -> Self {
        match error {
            WebFluxError::NetworkTransient(_) => FailureKind::Network,
            WebFluxError::NetworkPermanent(_) => FailureKind::Permanent,
            WebFluxError::RobotsDisallow => FailureKind::Policy,
            WebFluxError::ParseError(_) => FailureKind::Content,
            WebFluxError::QuotaExceeded(_) => FailureKind::RateLimited,
            WebFluxError::CapabilityUnavailable(_) => FailureKind::Capability,
            WebFluxError::Cancelled => FailureKind::Internal,
            WebFluxError::Internal(_) => FailureKind::Internal,
        }
    }

    /// Whether the orchestrator should requeue this failure at all.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Network | FailureKind::RateLimited)
    }

    fn delay_multiplier(&self) -> f64 {
        match self {
            FailureKind::RateLimited => 3.0,
            _ => 1.0,
        }
    }

    pub fn event_error_type(&self) -> &'static str {
        match self {
            FailureKind::Network => "Network",
            FailureKind::RateLimited => "RateLimited",
            FailureKind::Permanent => "Permanent",
            FailureKind::Policy => "Policy",
            FailureKind::Content => "Content",
            FailureKind::Capability => "Capability",
            FailureKind::Internal => "Internal",
        }
    }
}

/// Exponential backoff with jitter: `base * 2^(attempt-1) * multiplier *
/// (1 ± 20%)`, capped at 30s. `attempt` is 1-based (first retry attempt).
pub fn backoff_delay(attempt: u32, kind: FailureKind) -> Duration {
    let exp_delay = BASE_DELAY_MS.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let adjusted = (exp_delay as f64 * kind.delay_multiplier()) as u64;
    let jitter = rand::rng().random_range(-JITTER_FRACTION..=JITTER_FRACTION);
    let jittered = (adjusted as f64 * (1.0 + jitter)).max(0.0) as u64;
    Duration::from_millis(jittered.min(MAX_DELAY_MS))
}

/// Clamps a `Retry-After` hint into the [1s, 60s] window the rate limiter
/// is willing to honor as a delay.
pub fn clamp_retry_after(hint: Duration) -> Duration {
    hint.clamp(Duration::from_secs(1), Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_transient_is_retryable() {
        let kind = FailureKind::classify(&WebFluxError::NetworkTransient("timeout".to_string()));
        assert_eq!(kind, FailureKind::Network);
        assert!(kind.is_retryable());
    }

    #[test]
    fn robots_disallow_is_terminal() {
        let kind = FailureKind::classify(&WebFluxError::RobotsDisallow);
        assert_eq!(kind, FailureKind::Policy);
        assert!(!kind.is_retryable());
    }

    #[test]
    fn four_xx_other_than_429_is_terminal() {
        let kind = FailureKind::classify(&WebFluxError::NetworkPermanent("404".to_string()));
        assert!(!kind.is_retryable());
    }

    #[test]
    fn backoff_grows_monotonically_in_expectation() {
        let short = backoff_delay(1, FailureKind::Network);
        let long = backoff_delay(4, FailureKind::Network);
        assert!(short < Duration::from_secs(2));
        assert!(long <= Duration::from_secs(30));
    }

    #[test]
    fn retry_after_is_clamped_to_window() {
        assert_eq!(clamp_retry_after(Duration::from_millis(100)), Duration::from_secs(1));
        assert_eq!(clamp_retry_after(Duration::from_secs(600)), Duration::from_secs(60));
        assert_eq!(clamp_retry_after(Duration::from_secs(10)), Duration::from_secs(10));
    }
}
