//! Progress Tracker: job-scoped counters, ETA, and streaming snapshots.

mod snapshot;
mod tracker;

pub use snapshot::{ErrorEntry, ProgressSnapshot, ResponseTimeStats};
pub use tracker::ProgressTracker;
