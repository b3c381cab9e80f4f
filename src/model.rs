//! Shared data model: URL records, fetch results, and extracted content.
//!
//! Component-specific types (metadata bundle, quality info, chunks, robots
//! policy, progress snapshot, events) live in their owning modules and are
//! re-exported from `lib.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::metadata::MetadataBundle;
use crate::quality::QualityInfo;

/// Why a URL was added to the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryReason {
    Seed,
    Link,
    Sitemap,
}

/// A URL known to a job, with its discovery provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRecord {
    pub url: String,
    pub depth: u32,
    pub parent: Option<String>,
    pub reason: DiscoveryReason,
    pub discovered_at: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
}

impl UrlRecord {
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            parent: None,
            reason: DiscoveryReason::Seed,
            discovered_at: Utc::now(),
            retry_count: 0,
        }
    }

    pub fn child(url: impl Into<String>, parent: &str, depth: u32, reason: DiscoveryReason) -> Self {
        Self {
            url: url.into(),
            depth,
            parent: Some(parent.to_string()),
            reason,
            discovered_at: Utc::now(),
            retry_count: 0,
        }
    }
}

/// The raw result of fetching a URL, before extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub status: u16,
    pub body: Vec<u8>,
    pub declared_content_type: Option<String>,
    pub effective_url: String,
    pub response_time: Duration,
    pub size: usize,
    /// Parsed `Retry-After` header, seconds-only form. Present only on a 429.
    pub retry_after: Option<Duration>,
}

impl FetchResult {
    pub fn body_as_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A heading occurrence in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub anchor: Option<String>,
}

/// An image reference found in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub alt: Option<String>,
    pub context: Option<String>,
    pub position: usize,
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A link reference found in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRef {
    pub url: String,
    pub text: Option<String>,
    pub rel: Option<String>,
}

/// Fully extracted content for one URL: raw HTML plus everything derived
/// from it by the metadata extractor and quality evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub source_url: String,
    pub raw_html: String,
    pub main_text: String,
    pub title: Option<String>,
    pub headings: Vec<Heading>,
    pub images: Vec<ImageRef>,
    pub links: Vec<LinkRef>,
    pub metadata: MetadataBundle,
    pub language: String,
    pub quality: QualityInfo,
}
