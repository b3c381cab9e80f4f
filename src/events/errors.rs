//! Event bus error taxonomy, ported from `crawl_events::errors`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventBusError {
    #[error("failed to publish event: {0}")]
    PublishFailed(String),

    #[error("no subscribers are listening")]
    NoSubscribers,

    #[error("receiver lagged behind by {0} events")]
    ReceiverLagged(u64),

    #[error("event bus has shut down")]
    Shutdown,

    #[error("event bus channel is full")]
    ChannelFull,

    #[error("timed out waiting for {pending_operations} pending operations to drain")]
    DrainTimeout { pending_operations: usize },

    #[error("timed out publishing event")]
    PublishTimeout,
}
