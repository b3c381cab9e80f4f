//! MemoryOptimized: the same fixed-size windowing as `FixedSize`, but
//! produced through a bounded channel so the strategy never holds more than
//! `buffer_capacity` pending windows in flight at once.

use crate::capabilities::EmbeddingBackend;
use crate::error::WebFluxResult;
use crate::model::ExtractedContent;

use super::registry::ChunkingStrategy;
use super::types::{Chunk, ChunkType, ChunkingParams};

const DEFAULT_BUFFER_CAPACITY: usize = 4;

pub struct MemoryOptimizedStrategy;

#[async_trait::async_trait]
impl ChunkingStrategy for MemoryOptimizedStrategy {
    fn name(&self) -> &'static str {
        "MemoryOptimized"
    }

    fn description(&self) -> &'static str {
        "Streaming fixed-size windows through a bounded in-flight buffer"
    }

    async fn chunk(
        &self,
        content: &ExtractedContent,
        params: &ChunkingParams,
        _embeddings: Option<&(dyn EmbeddingBackend)>,
    ) -> WebFluxResult<Vec<Chunk>> {
        let buffer_capacity = params
            .strategy_options
            .get("buffer_capacity")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BUFFER_CAPACITY)
            .max(1);

        let (tx, mut rx) = tokio::sync::mpsc::channel::<String>(buffer_capacity);
        let text = content.main_text.clone();
        let chunk_size = params.max_chunk_size.max(1);
        let overlap = params.overlap;

        let producer = tokio::spawn(async move {
            let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
            let step = chunk_size.saturating_sub(overlap).max(1);
            let total_chars = boundaries.len().saturating_sub(1);
            let mut start = 0usize;
            while start < total_chars {
                let end = (start + chunk_size).min(total_chars);
                let window = &text[boundaries[start]..boundaries[end]];
                // backpressure: awaiting send blocks the producer once the
                // channel is full, bounding how far ahead it can run.
                if tx.send(window.to_string()).await.is_err() {
                    break;
                }
                if end == total_chars {
                    break;
                }
                start += step;
            }
        });

        let mut windows = Vec::new();
        while let Some(window) = rx.recv().await {
            windows.push(window);
        }
        let _ = producer.await;

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
    use crate::metadata::extract_metadata;
    use crate::quality::evaluate_quality;

    fn extracted_content(text: &str) -> ExtractedContent {
        let metadata = extract_metadata(text, text);
        let quality = evaluate_quality("https://example.com", text, text, None, false, 0);
        ExtractedContent {
            source_url: "https://example.com".to_string(),
            raw_html: text.to_string(),
            main_text: text.to_string(),
            title: None,
            headings: Vec::new(),
            images: Vec::new(),
            links: Vec::new(),
            metadata,
            language: "en".to_string(),
            quality,
        }
    }

    #[tokio::test]
    async fn produces_same_windows_as_fixed_size() {
        let text: String = (0..250).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let content = extracted_content(&text);
        let strategy = MemoryOptimizedStrategy;
        let params = ChunkingParams { max_chunk_size: 100, min_chunk_size: 0, overlap: 20, strategy_options: Default::default() };
        let chunks = strategy.chunk(&content, &params, None).await.unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.chars().count(), 100);
        assert_eq!(chunks[2].content.chars().count(), 70);
    }

    #[tokio::test]
    async fn respects_configured_buffer_capacity() {
        let text: String = (0..500).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let content = extracted_content(&text);
        let strategy = MemoryOptimizedStrategy;
        let mut opts = std::collections::HashMap::new();
        opts.insert("buffer_capacity".to_string(), "1".to_string());
        let params = ChunkingParams { max_chunk_size: 50, min_chunk_size: 0, overlap: 0, strategy_options: opts };
        let chunks = strategy.chunk(&content, &params, None).await.unwrap();
        assert_eq!(chunks.len(), 10);
    }
}
