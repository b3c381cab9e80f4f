//! The crawl frontier: a dedup'd, depth- and policy-bounded URL queue.
//!
//! Dedup/visited-set shape grounded on `crawl_engine::orchestrator`'s
//! lock-free `DashSet<String>` visited set guarding a `VecDeque` queue
//! behind a `tokio::sync::Mutex`.

use std::collections::VecDeque;

use dashmap::DashSet;
use once_cell::sync::OnceCell;
use regex::Regex;
use tokio::sync::Mutex;

use crate::config::CrawlConfiguration;
use crate::model::{DiscoveryReason, UrlRecord};

/// Normalizes a URL to its canonical dedup key: scheme, lowercased host,
/// path, and query, with the fragment dropped.
fn canonicalize(url: &str) -> Option<String> {
    let mut parsed = url::Url::parse(url).ok()?;
    parsed.set_fragment(None);
    if let Some(host) = parsed.host_str() {
        let host = host.to_lowercase();
        let _ = parsed.set_host(Some(&host));
    }
    Some(parsed.to_string())
}

fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    Some(format!("{}://{}", parsed.scheme(), parsed.host_str()?))
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(err) => {
                log::warn!("ignoring malformed frontier pattern '{p}': {err}");
                None
            }
        })
        .collect()
}

/// Unique, depth- and policy-bounded URL queue for one crawl job.
pub struct Frontier {
    queue: Mutex<VecDeque<UrlRecord>>,
    seen: DashSet<String>,
    max_depth: u32,
    max_urls: Option<usize>,
    allow: Vec<Regex>,
    deny: Vec<Regex>,
    same_origin_only: bool,
    origin: OnceCell<String>,
}

impl Frontier {
    pub fn new(config: &CrawlConfiguration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            seen: DashSet::new(),
            max_depth: config.max_depth(),
            max_urls: config.max_urls(),
            allow: compile_patterns(config.allow_patterns()),
            deny: compile_patterns(config.deny_patterns()),
            same_origin_only: config.same_origin_only(),
            origin: OnceCell::new(),
        }
    }

    fn passes_allow_deny(&self, url: &str) -> bool {
        if self.deny.iter().any(|re| re.is_match(url)) {
            return false;
        }
        if self.allow.is_empty() {
            return true;
        }
        self.allow.iter().any(|re| re.is_match(url))
    }

    fn passes_same_origin(&self, url: &str) -> bool {
        if !self.same_origin_only {
            return true;
        }
        let Some(want) = self.origin.get() else { return true };
        origin_of(url).as_deref() == Some(want.as_str())
    }

    /// Seeds the frontier from the job's configured seed URLs.
    pub async fn seed(&self, config: &CrawlConfiguration) -> usize {
        let mut count = 0;
        for url in config.seed_urls() {
            if self.try_enqueue(UrlRecord::seed(url.clone())).await {
                count += 1;
            }
        }
        count
    }

    /// Enqueues links discovered on an already-fetched page.
    pub async fn enqueue_links(&self, parent: &str, parent_depth: u32, links: &[String]) -> usize {
        let mut count = 0;
        for link in links {
            let record = UrlRecord::child(link.clone(), parent, parent_depth + 1, DiscoveryReason::Link);
            if self.try_enqueue(record).await {
                count += 1;
            }
        }
        count
    }

    /// Enqueues URLs discovered via a sitemap, always at depth 0.
    pub async fn enqueue_sitemap(&self, urls: &[String]) -> usize {
        let mut count = 0;
        for url in urls {
            let record = UrlRecord {
                url: url.clone(),
                depth: 0,
                parent: None,
                reason: DiscoveryReason::Sitemap,
                discovered_at: chrono::Utc::now(),
                retry_count: 0,
            };
            if self.try_enqueue(record).await {
                count += 1;
            }
        }
        count
    }

    /// Evaluates `record` against depth, same-origin, allow/deny, dedup,
    /// and the job-wide URL cap, pushing it onto the queue if it passes
    /// every gate. Returns whether it was enqueued.
    pub async fn try_enqueue(&self, record: UrlRecord) -> bool {
        if record.depth > self.max_depth {
            return false;
        }
        let Some(canonical) = canonicalize(&record.url) else { return false };

        if self.origin.get().is_none() {
            if let Some(origin) = origin_of(&record.url) {
                let _ = self.origin.set(origin);
            }
        }
        if !self.passes_same_origin(&record.url) {
            return false;
        }
        if !self.passes_allow_deny(&record.url) {
            return false;
        }
        if !self.seen.insert(canonical.clone()) {
            return false;
        }
        if let Some(max) = self.max_urls {
            if self.seen.len() > max {
                self.seen.remove(&canonical);
                return false;
            }
        }

        self.queue.lock().await.push_back(record);
        true
    }

    pub async fn dequeue(&self) -> Option<UrlRecord> {
        self.queue.lock().await.pop_front()
    }

    /// Re-queues a previously dequeued record after a retryable failure,
    /// bypassing the dedup check since it was already admitted once.
    pub async fn requeue(&self, record: UrlRecord) {
        self.queue.lock().await.push_back(record);
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }

    pub fn discovered_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfigBuilder;

    #[tokio::test]
    async fn dedup_by_canonical_url_ignores_fragment() {
        let config = CrawlConfigBuilder::new().seed_url("https://example.com/a").build();
        let frontier = Frontier::new(&config);
        assert!(frontier.try_enqueue(UrlRecord::seed("https://example.com/a#section")).await);
        assert!(!frontier.try_enqueue(UrlRecord::seed("https://Example.com/a")).await);
        assert_eq!(frontier.len().await, 1);
    }

    #[tokio::test]
    async fn depth_beyond_max_is_rejected() {
        let config = CrawlConfigBuilder::new().max_depth(1).build();
        let frontier = Frontier::new(&config);
        let deep = UrlRecord::child("https://example.com/deep", "https://example.com/", 5, DiscoveryReason::Link);
        assert!(!frontier.try_enqueue(deep).await);
    }

    #[tokio::test]
    async fn same_origin_only_rejects_other_hosts() {
        let config = CrawlConfigBuilder::new().same_origin_only(true).build();
        let frontier = Frontier::new(&config);
        assert!(frontier.try_enqueue(UrlRecord::seed("https://example.com/")).await);
        assert!(!frontier.try_enqueue(UrlRecord::seed("https://other.test/")).await);
        assert!(frontier.try_enqueue(UrlRecord::seed("https://example.com/page")).await);
    }

    #[tokio::test]
    async fn deny_pattern_wins_over_allow() {
        let config = CrawlConfigBuilder::new().allow_pattern(".*").deny_pattern("/private/.*").build();
        let frontier = Frontier::new(&config);
        assert!(!frontier.try_enqueue(UrlRecord::seed("https://example.com/private/x")).await);
        assert!(frontier.try_enqueue(UrlRecord::seed("https://example.com/public/x")).await);
    }

    #[tokio::test]
    async fn max_urls_caps_total_discovery() {
        let config = CrawlConfigBuilder::new().max_urls(1).build();
        let frontier = Frontier::new(&config);
        assert!(frontier.try_enqueue(UrlRecord::seed("https://example.com/a")).await);
        assert!(!frontier.try_enqueue(UrlRecord::seed("https://example.com/b")).await);
    }

    #[tokio::test]
    async fn sitemap_seeding_is_depth_zero() {
        let config = CrawlConfigBuilder::new().build();
        let frontier = Frontier::new(&config);
        let added = frontier.enqueue_sitemap(&["https://example.com/s1".to_string()]).await;
        assert_eq!(added, 1);
        let record = frontier.dequeue().await.unwrap();
        assert_eq!(record.depth, 0);
        assert_eq!(record.reason, DiscoveryReason::Sitemap);
    }
}
