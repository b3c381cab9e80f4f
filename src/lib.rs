//! WebFlux: a RAG-oriented web content pipeline.
//!
//! The Crawl Orchestrator drives per-URL fetch, extract, reconstruct, and
//! chunk through a worker pool, guarded by the Policy Cache and Rate
//! Limiter and observed through the Progress Tracker & Event Bus. The Token
//! Counter, Metadata Extractor, and Content Quality Evaluator feed the
//! Chunking Strategy Selector, which hands off to one of the registered
//! Chunking Strategies.
#![feature(integer_atomics)]

pub mod cancel;
pub mod capabilities;
pub mod chunking;
pub mod config;
pub mod crawl;
pub mod error;
pub mod events;
pub mod extract;
pub mod metadata;
pub mod model;
pub mod policy;
pub mod progress;
pub mod quality;
pub mod rate_limiter;
pub mod reconstruct;
pub mod tokens;

pub use cancel::Cancellation;
pub use capabilities::{CacheStore, CompletionBackend, EmbeddingBackend, Fetcher, NoCompletionBackend, NoEmbeddingBackend, ReqwestFetcher, TokenizerBackend};
pub use chunking::{renumber, Chunk, ChunkType, ChunkingParams, ChunkingRegistry, ChunkingStrategy, ContentCharacteristics, SelectorRecommendation, StrategyScore, SubScore, resolve_registry_name, select_strategy};
pub use config::{ChunkingOptions, ChunkingOptionsBuilder, CrawlConfigBuilder, CrawlConfiguration, ReconstructOptions, ReconstructOptionsBuilder};
pub use crawl::{backoff_delay, clamp_retry_after, CrawlOutcome, FailureKind, Frontier, Orchestrator, UrlState};
pub use error::{WebFluxError, WebFluxResult};
pub use events::{BackpressureMode, BatchPublishResult, CrawlEvent, CrawlEventBus, EventBusConfig, EventBusError, EventBusMetrics, FilteredReceiver, MetricsSnapshot, ShutdownReason};
pub use extract::{extract_facts, ExtractedFacts};
pub use metadata::{extract_metadata, MetadataBundle};
pub use model::{DiscoveryReason, ExtractedContent, FetchResult, Heading, ImageRef, LinkRef, UrlRecord};
pub use policy::{AgentGroup, Manifest, ManifestIcon, PolicyCache, RequestRate, RobotsMetadata, RobotsRule, RuleType, VisitTimeWindow, MANIFEST_PROBE_PATHS};
pub use progress::{ErrorEntry, ProgressSnapshot, ProgressTracker, ResponseTimeStats};
pub use quality::{evaluate_quality, ContentType, QualityInfo};
pub use rate_limiter::{HostPolicy, RateLimitDecision, RateLimiter};
pub use reconstruct::{by_name, resolve_strategy, AnalyzedContent, QualityLevel, ReconstructStrategy, ReconstructedContent, VariantCharacteristics};
pub use tokens::{ModelFamily, ModelStatistics, ModelTokenCount, TokenAnalysis, TokenCounter};
