//! Policy Cache: robots.txt, manifest, and sitemap snapshots with TTL.

mod cache;
mod manifest;
mod robots;

pub use cache::PolicyCache;
pub use manifest::{Manifest, ManifestIcon, MANIFEST_PROBE_PATHS};
pub use robots::{AgentGroup, RequestRate, RobotsMetadata, RobotsRule, RuleType, VisitTimeWindow};
