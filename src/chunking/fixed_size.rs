//! FixedSize: exact character-count chunks with an overlapping prefix.

use crate::capabilities::EmbeddingBackend;
use crate::error::WebFluxResult;
use crate::model::ExtractedContent;

use super::registry::ChunkingStrategy;
use super::types::{Chunk, ChunkType, ChunkingParams};

pub struct FixedSizeStrategy;

/// Splits `text` into `chunk_size`-character windows stepping by
/// `chunk_size - overlap`; the final window may be shorter.
pub fn split_fixed_size(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[async_trait::async_trait]
impl ChunkingStrategy for FixedSizeStrategy {
    fn name(&self) -> &'static str {
        "FixedSize"
    }

    fn description(&self) -> &'static str {
        "Fixed character-count windows with a configurable overlap prefix"
    }

    async fn chunk(
        &self,
        content: &ExtractedContent,
        params: &ChunkingParams,
        _embeddings: Option<&(dyn EmbeddingBackend)>,
    ) -> WebFluxResult<Vec<Chunk>> {
        let windows = split_fixed_size(&content.main_text, params.max_chunk_size, params.overlap);
        let chunks = windows
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(&content.source_url, i, text, ChunkType::Text, Vec::new(), self.name()))
            .collect();
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s6_three_chunks_of_100_100_70() {
        let text: String = (0..250).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = split_fixed_size(&text, 100, 20);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 100);
        assert_eq!(chunks[1].chars().count(), 100);
        assert_eq!(chunks[2].chars().count(), 70);
    }

    #[test]
    fn chunk_offsets_step_by_chunk_size_minus_overlap() {
        let text: String = (0..250).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = split_fixed_size(&text, 100, 20);
        let chars: Vec<char> = text.chars().collect();
        assert_eq!(chunks[0], chars[0..100].iter().collect::<String>());
        assert_eq!(chunks[1], chars[80..180].iter().collect::<String>());
        assert_eq!(chunks[2], chars[160..250].iter().collect::<String>());
    }
}
