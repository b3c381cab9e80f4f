//! Policy Cache: per-host robots.txt, manifest, and sitemap snapshots with
//! TTL and at-most-one-fetch.
//!
//! Lazy-insert-or-get shape grounded on `crawl_engine::domain_limiter`'s
//! `DomainLimiter::acquire`; the concurrent map itself is the same
//! `DashMap`-per-key idiom used throughout `crawl_engine`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::manifest::{parse_manifest, Manifest, MANIFEST_PROBE_PATHS};
use super::robots::RobotsMetadata;
use crate::capabilities::Fetcher;

const DEFAULT_TTL: Duration = Duration::from_secs(4 * 3600);

struct CachedRobots {
    policy: Arc<RobotsMetadata>,
    fetched_at: Instant,
}

struct CachedManifest {
    manifest: Arc<Option<Manifest>>,
    fetched_at: Instant,
}

/// Per-host cache of robots.txt and manifest snapshots.
///
/// Each host's slot is a `tokio::sync::Mutex`, so concurrent lookups for the
/// same host naturally share the in-flight fetch: the second caller simply
/// waits for the lock and then observes the freshly populated entry instead
/// of issuing a second request.
pub struct PolicyCache<F: Fetcher> {
    fetcher: Arc<F>,
    robots: DashMap<String, Arc<Mutex<Option<CachedRobots>>>>,
    manifests: DashMap<String, Arc<Mutex<Option<CachedManifest>>>>,
    ttl: Duration,
    user_agent: String,
}

impl<F: Fetcher> PolicyCache<F> {
    pub fn new(fetcher: Arc<F>, user_agent: impl Into<String>) -> Self {
        Self { fetcher, robots: DashMap::new(), manifests: DashMap::new(), ttl: DEFAULT_TTL, user_agent: user_agent.into() }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn origin_of(url: &str) -> Option<String> {
        url::Url::parse(url).ok().map(|u| format!("{}://{}", u.scheme(), u.host_str().unwrap_or_default()))
    }

    /// Resolve the robots policy for `url`'s origin, fetching and caching it
    /// if absent or expired (I6).
    pub async fn robots_for(&self, url: &str) -> Arc<RobotsMetadata> {
        let Some(origin) = Self::origin_of(url) else {
            return Arc::new(RobotsMetadata::permissive(url));
        };

        let slot = self.robots.entry(origin.clone()).or_insert_with(|| Arc::new(Mutex::new(None))).clone();
        let mut guard = slot.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.policy.clone();
            }
        }

        let robots_url = format!("{origin}/robots.txt");
        let policy = match self.fetcher.fetch(&robots_url, &self.user_agent, Duration::from_secs(10)).await {
            Ok(result) if result.status == 404 => Arc::new(RobotsMetadata::permissive(&origin)),
            Ok(result) if (200..300).contains(&result.status) => {
                Arc::new(RobotsMetadata::parse(&origin, &result.body_as_str()))
            }
            Ok(result) if result.status >= 500 => Arc::new(RobotsMetadata::disallow_all(&origin)),
            Ok(_) => Arc::new(RobotsMetadata::permissive(&origin)),
            // A network failure (timeout, DNS, connection refused) is not a
            // server opinion on crawlability; default-allow rather than lock
            // the host out entirely.
            Err(_) => Arc::new(RobotsMetadata::permissive(&origin)),
        };

        *guard = Some(CachedRobots { policy: policy.clone(), fetched_at: Instant::now() });
        policy
    }

    /// Probe the fixed well-known manifest paths in order, returning the
    /// first one that parses. A malformed or absent manifest is `None`, not
    /// an error.
    pub async fn manifest_for(&self, url: &str) -> Arc<Option<Manifest>> {
        let Some(origin) = Self::origin_of(url) else { return Arc::new(None) };

        let slot = self.manifests.entry(origin.clone()).or_insert_with(|| Arc::new(Mutex::new(None))).clone();
        let mut guard = slot.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.manifest.clone();
            }
        }

        let mut found = None;
        for path in MANIFEST_PROBE_PATHS {
            let manifest_url = format!("{origin}{path}");
            if let Ok(result) = self.fetcher.fetch(&manifest_url, &self.user_agent, Duration::from_secs(10)).await {
                if (200..300).contains(&result.status) {
                    if let Some(manifest) = parse_manifest(&origin, &result.body_as_str()) {
                        found = Some(manifest);
                        break;
                    }
                }
            }
        }

        let manifest = Arc::new(found);
        *guard = Some(CachedManifest { manifest: manifest.clone(), fetched_at: Instant::now() });
        manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WebFluxResult;
    use crate::model::FetchResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        body: String,
        status: u16,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, _url: &str, _user_agent: &str, _timeout: Duration) -> WebFluxResult<FetchResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResult {
                status: self.status,
                body: self.body.clone().into_bytes(),
                declared_content_type: None,
                effective_url: "https://example.com/robots.txt".to_string(),
                response_time: Duration::from_millis(1),
                size: self.body.len(),
                retry_after: None,
            })
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl Fetcher for FailingFetcher {
        async fn fetch(&self, _url: &str, _user_agent: &str, _timeout: Duration) -> WebFluxResult<FetchResult> {
            Err(crate::error::WebFluxError::NetworkTransient("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn concurrent_lookups_fetch_once() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            body: "User-agent: *\nDisallow: /private/".to_string(),
            status: 200,
        });
        let cache = Arc::new(PolicyCache::new(fetcher.clone(), "WebFlux/0.1"));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.robots_for("https://example.com/a").await }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_is_permissive() {
        let fetcher = Arc::new(CountingFetcher { calls: AtomicUsize::new(0), body: String::new(), status: 404 });
        let cache = PolicyCache::new(fetcher, "WebFlux/0.1");
        let policy = cache.robots_for("https://example.com/x").await;
        assert!(policy.is_allowed("/anything", "anybot"));
    }

    #[tokio::test]
    async fn server_error_is_disallow_all() {
        let fetcher = Arc::new(CountingFetcher { calls: AtomicUsize::new(0), body: String::new(), status: 503 });
        let cache = PolicyCache::new(fetcher, "WebFlux/0.1");
        let policy = cache.robots_for("https://example.com/x").await;
        assert!(!policy.is_allowed("/anything", "anybot"));
    }

    #[tokio::test]
    async fn network_failure_is_permissive_not_disallow_all() {
        let cache = PolicyCache::new(Arc::new(FailingFetcher), "WebFlux/0.1");
        let policy = cache.robots_for("https://example.com/x").await;
        assert!(policy.is_allowed("/anything", "anybot"));
    }
}
