//! Chunking strategy capability interface and a name → factory registry.
//!
//! Mirrors the design note's "small shared-helper utility module plus a
//! registry keyed by name" guidance for the base chunking strategy.

use std::collections::HashMap;

use crate::capabilities::EmbeddingBackend;
use crate::error::WebFluxResult;
use crate::model::ExtractedContent;

use super::types::{Chunk, ChunkingParams};

/// A chunking strategy: `Name`/`Description` plus `ChunkAsync`.
#[async_trait::async_trait]
pub trait ChunkingStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    async fn chunk(
        &self,
        content: &ExtractedContent,
        params: &ChunkingParams,
        embeddings: Option<&(dyn EmbeddingBackend)>,
    ) -> WebFluxResult<Vec<Chunk>>;
}

pub type StrategyFactory = fn() -> Box<dyn ChunkingStrategy>;

/// Name-keyed registry of available chunking strategies.
pub struct ChunkingRegistry {
    factories: HashMap<&'static str, StrategyFactory>,
}

impl ChunkingRegistry {
    pub fn with_defaults() -> Self {
        let mut factories: HashMap<&'static str, StrategyFactory> = HashMap::new();
        factories.insert("DomStructure", || Box::new(super::dom_structure::DomStructureStrategy));
        factories.insert("Paragraph", || Box::new(super::paragraph::ParagraphStrategy));
        factories.insert("FixedSize", || Box::new(super::fixed_size::FixedSizeStrategy));
        factories.insert("Semantic", || Box::new(super::semantic::SemanticStrategy));
        factories.insert("MemoryOptimized", || Box::new(super::memory_optimized::MemoryOptimizedStrategy));
        Self { factories }
    }

    pub fn get(&self, name: &str) -> Option<Box<dyn ChunkingStrategy>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for ChunkingRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
