//! Crate-wide error type unifying the per-component error enums.

use thiserror::Error;

/// Error kinds surfaced at job/orchestrator boundaries.
///
/// Mirrors the per-URL failure taxonomy from the error handling design:
/// transient network errors are retried upstream before ever reaching this
/// type, so by the time a `WebFluxError` is constructed the retry budget is
/// already spent or the failure is inherently terminal.
#[derive(Debug, Error)]
pub enum WebFluxError {
    #[error("transient network error: {0}")]
    NetworkTransient(String),

    #[error("permanent network error: {0}")]
    NetworkPermanent(String),

    #[error("disallowed by robots.txt")]
    RobotsDisallow,

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("cancelled")]
    Cancelled,

    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WebFluxError {
    /// Whether this error kind is retryable at the orchestrator's discretion.
    ///
    /// Only used for classification/reporting; the actual retry loop lives in
    /// `crawl::retry` and works off `FailureKind`, not this enum.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebFluxError::NetworkTransient(_))
    }
}

impl From<anyhow::Error> for WebFluxError {
    fn from(err: anyhow::Error) -> Self {
        WebFluxError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for WebFluxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            WebFluxError::NetworkTransient(err.to_string())
        } else if let Some(status) = err.status() {
            if status.as_u16() == 429 || status.is_server_error() {
                WebFluxError::NetworkTransient(err.to_string())
            } else {
                WebFluxError::NetworkPermanent(err.to_string())
            }
        } else {
            WebFluxError::NetworkPermanent(err.to_string())
        }
    }
}

pub type WebFluxResult<T> = Result<T, WebFluxError>;
