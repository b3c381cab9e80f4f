//! Progress Tracker & Event Bus: crawl lifecycle events fanned out over a
//! broadcast channel with configurable backpressure.

mod bus;
mod config;
mod errors;
mod metrics;
mod streaming;
mod types;

pub use bus::CrawlEventBus;
pub use config::{BackpressureMode, EventBusConfig};
pub use errors::EventBusError;
pub use metrics::{EventBusMetrics, MetricsSnapshot};
pub use streaming::FilteredReceiver;
pub use types::{BatchPublishResult, CrawlEvent, ShutdownReason};
