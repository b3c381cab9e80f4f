//! Configuration for crawl jobs, reconstruct strategies, and chunking.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::{ChunkingOptionsBuilder, CrawlConfigBuilder, ReconstructOptionsBuilder};
pub use types::{ChunkingOptions, CrawlConfiguration, ReconstructOptions};
