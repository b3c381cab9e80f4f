//! Shared chunk types and options, common to every chunking strategy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkType {
    Text,
    Code,
    Table,
    List,
}

/// A retrieval unit of text with structural provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub sequence: usize,
    pub content: String,
    pub chunk_type: ChunkType,
    pub source_url: String,
    pub heading_path: Vec<String>,
    pub section_title: Option<String>,
    pub quality: f64,
    pub parent_id: Option<String>,
    pub children_ids: Vec<String>,
    pub related_images: Vec<String>,
    pub tags: Vec<String>,
    pub context_dependency: f64,
    pub strategy: String,
    pub parameters: HashMap<String, String>,
}

impl Chunk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_url: &str,
        sequence: usize,
        content: String,
        chunk_type: ChunkType,
        heading_path: Vec<String>,
        strategy: &str,
    ) -> Self {
        Self {
            id: format!("{source_url}#chunk-{sequence}"),
            sequence,
            content,
            chunk_type,
            source_url: source_url.to_string(),
            section_title: heading_path.last().cloned(),
            heading_path,
            quality: 1.0,
            parent_id: None,
            children_ids: Vec::new(),
            related_images: Vec::new(),
            tags: Vec::new(),
            context_dependency: 0.0,
            strategy: strategy.to_string(),
            parameters: HashMap::new(),
        }
    }
}

/// Renumbers chunks to dense, 0-based sequence numbers, preserving order.
/// Invariant I1.
pub fn renumber(chunks: &mut [Chunk]) {
    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.sequence = i;
        chunk.id = format!("{}#chunk-{}", chunk.source_url, i);
    }
}

#[derive(Debug, Clone)]
pub struct ChunkingParams {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
    pub overlap: usize,
    pub strategy_options: HashMap<String, String>,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self { max_chunk_size: 2000, min_chunk_size: 100, overlap: 200, strategy_options: HashMap::new() }
    }
}

impl From<&crate::config::ChunkingOptions> for ChunkingParams {
    fn from(opts: &crate::config::ChunkingOptions) -> Self {
        Self {
            max_chunk_size: opts.max_chunk_size(),
            min_chunk_size: opts.min_chunk_size(),
            overlap: opts.overlap(),
            strategy_options: opts.strategy_options().clone(),
        }
    }
}

/// Splits `text` on the first sentence boundary at or before `limit`
/// characters, falling back to a hard cut at `limit` if none is found.
pub fn split_at_sentence_boundary(text: &str, limit: usize) -> (String, String) {
    const BOUNDARIES: [&str; 3] = [". ", ".\n", ".\r\n"];
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return (text.to_string(), String::new());
    }

    let window: String = chars[..limit].iter().collect();
    let mut best: Option<usize> = None;
    for boundary in BOUNDARIES {
        if let Some(idx) = window.rfind(boundary) {
            let split_at = idx + 1;
            best = Some(best.map_or(split_at, |b: usize| b.max(split_at)));
        }
    }

    match best {
        Some(byte_idx) => {
            let (head, tail) = text.split_at(byte_idx);
            (head.to_string(), tail.trim_start().to_string())
        }
        None => {
            let head: String = chars[..limit].iter().collect();
            let tail: String = chars[limit..].iter().collect();
            (head, tail)
        }
    }
}
