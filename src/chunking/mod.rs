//! Chunking Strategies & Selector: splits extracted content into retrieval
//! chunks via a pluggable, name-registered strategy.

mod dom_structure;
mod fixed_size;
mod memory_optimized;
mod paragraph;
mod registry;
mod selector;
mod semantic;
mod types;

pub use registry::{ChunkingRegistry, ChunkingStrategy};
pub use selector::{resolve_registry_name, select_strategy, ContentCharacteristics, SelectorRecommendation, StrategyScore, SubScore};
pub use types::{renumber, Chunk, ChunkType, ChunkingParams};
