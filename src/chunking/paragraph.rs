//! Paragraph: packs blank-line-separated paragraphs into size-bounded chunks.

use crate::capabilities::EmbeddingBackend;
use crate::error::WebFluxResult;
use crate::model::ExtractedContent;

use super::registry::ChunkingStrategy;
use super::types::{split_at_sentence_boundary, Chunk, ChunkType, ChunkingParams};

pub struct ParagraphStrategy;

pub(crate) fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// Packs paragraphs into chunks no larger than `max_size`, only splitting a
/// paragraph internally (at a sentence boundary) when it alone exceeds the
/// limit.
pub fn pack_paragraphs(text: &str, max_size: usize) -> Vec<String> {
    let paragraphs = split_paragraphs(text);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs {
        let mut remaining = paragraph.to_string();
        while remaining.chars().count() > max_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let (head, tail) = split_at_sentence_boundary(&remaining, max_size);
            chunks.push(head);
            remaining = tail;
        }

        let candidate_len = if current.is_empty() {
            remaining.chars().count()
        } else {
            current.chars().count() + 2 + remaining.chars().count()
        };

        if candidate_len > max_size && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if current.is_empty() {
            current = remaining;
        } else {
            current.push_str("\n\n");
            current.push_str(&remaining);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait::async_trait]
impl ChunkingStrategy for ParagraphStrategy {
    fn name(&self) -> &'static str {
        "Paragraph"
    }

    fn description(&self) -> &'static str {
        "Packs paragraphs into size-bounded chunks without splitting mid-paragraph"
    }

    async fn chunk(
        &self,
        content: &ExtractedContent,
        params: &ChunkingParams,
        _embeddings: Option<&(dyn EmbeddingBackend)>,
    ) -> WebFluxResult<Vec<Chunk>> {
        let packed = pack_paragraphs(&content.main_text, params.max_chunk_size);
        let chunks = packed
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
    fn packs_small_paragraphs_together() {
        let text = "one.\n\ntwo.\n\nthree.";
        let chunks = pack_paragraphs(text, 1000);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("one.") && chunks[0].contains("three."));
    }

    #[test]
    fn splits_when_a_paragraph_alone_exceeds_max() {
        let long_paragraph = "Sentence one. Sentence two. Sentence three. Sentence four.";
        let chunks = pack_paragraphs(long_paragraph, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn starts_a_new_chunk_once_max_size_would_be_exceeded() {
        let text = "aaaa.\n\nbbbb.\n\ncccc.";
        let chunks = pack_paragraphs(text, 10);
        assert!(chunks.len() >= 2);
    }
}
