//! Semantic: groups consecutive paragraphs while their embedding stays
//! close to a running centroid. Falls back to Paragraph when no embedding
//! backend is configured.

use crate::capabilities::EmbeddingBackend;
use crate::error::WebFluxResult;
use crate::model::ExtractedContent;

use super::paragraph::{split_paragraphs, ParagraphStrategy};
use super::registry::ChunkingStrategy;
use super::types::{Chunk, ChunkType, ChunkingParams};

const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let dot: f64 = a[..len].iter().zip(&b[..len]).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a[..len].iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b[..len].iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn average_vectors(a: &[f32], b: &[f32]) -> Vec<f32> {
    let len = a.len().max(b.len());
    (0..len).map(|i| (a.get(i).copied().unwrap_or(0.0) + b.get(i).copied().unwrap_or(0.0)) / 2.0).collect()
}

pub struct SemanticStrategy;

#[async_trait::async_trait]
impl ChunkingStrategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "Semantic"
    }

    fn description(&self) -> &'static str {
        "Groups consecutive paragraphs by embedding similarity to a running centroid"
    }

    async fn chunk(
        &self,
        content: &ExtractedContent,
        params: &ChunkingParams,
        embeddings: Option<&(dyn EmbeddingBackend)>,
    ) -> WebFluxResult<Vec<Chunk>> {
        let Some(embedder) = embeddings else {
            let mut chunks = ParagraphStrategy.chunk(content, params, None).await?;
            for chunk in &mut chunks {
                chunk.strategy = self.name().to_string();
            }
            return Ok(chunks);
        };

        let threshold = params
            .strategy_options
            .get("similarity_threshold")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);

        let paragraphs = split_paragraphs(&content.main_text);
        let mut groups: Vec<Vec<&str>> = Vec::new();
        let mut current_group: Vec<&str> = Vec::new();
        let mut current_len = 0usize;
        let mut centroid: Option<Vec<f32>> = None;

        for paragraph in paragraphs {
            let embedding = embedder.embed(paragraph).await?;
            let similarity = centroid.as_ref().map(|c| cosine_similarity(c, &embedding)).unwrap_or(1.0);
            let candidate_len = current_len + paragraph.chars().count();

            if !current_group.is_empty() && (similarity < threshold || candidate_len > params.max_chunk_size) {
                groups.push(std::mem::take(&mut current_group));
                centroid = None;
                current_len = 0;
            }

            current_group.push(paragraph);
            current_len += paragraph.chars().count();
            centroid = Some(match centroid {
                Some(c) => average_vectors(&c, &embedding),
                None => embedding,
            });
        }
        if !current_group.is_empty() {
            groups.push(current_group);
        }

        let chunks = groups
            .into_iter()
            .enumerate()
            .map(|(i, group)| Chunk::new(&content.source_url, i, group.join("\n\n"), ChunkType::Text, Vec::new(), self.name()))
            .collect();
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WebFluxResult as Result;
    use crate::metadata::extract_metadata;
    use crate::quality::evaluate_quality;

    struct FixedEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingBackend for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // deterministic toy embedding: similar paragraphs (same first word) get similar vectors
            let first_word = text.split_whitespace().next().unwrap_or("");
            let seed = first_word.bytes().map(|b| b as f32).sum::<f32>();
            Ok(vec![seed, seed / 2.0, 1.0])
        }
    }

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
    async fn falls_back_to_paragraph_without_embedder() {
        let content = extracted_content("alpha one.\n\nalpha two.");
        let strategy = SemanticStrategy;
        let params = ChunkingParams::default();
        let chunks = strategy.chunk(&content, &params, None).await.unwrap();
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].strategy, "Semantic");
    }

    #[tokio::test]
    async fn groups_paragraphs_with_embedder() {
        let content = extracted_content("alpha one.\n\nalpha two.\n\nzzz three.");
        let strategy = SemanticStrategy;
        let embedder = FixedEmbedder;
        let params = ChunkingParams::default();
        let chunks = strategy.chunk(&content, &params, Some(&embedder)).await.unwrap();
        assert!(!chunks.is_empty());
    }
}
