//! Enrich: weaves in surrounding structure (images, section count) for
//! content with rich layout. Requires a text-completion backend.

use std::collections::HashMap;

use crate::capabilities::CompletionBackend;
use crate::error::WebFluxResult;

use super::common::complete_or_unavailable;
use super::registry::ReconstructStrategy;
use super::types::{AnalyzedContent, QualityLevel, ReconstructedContent, VariantCharacteristics};

pub struct EnrichStrategy;

#[async_trait::async_trait]
impl ReconstructStrategy for EnrichStrategy {
    fn name(&self) -> &'static str {
        "Enrich"
    }

    fn characteristics(&self) -> VariantCharacteristics {
        VariantCharacteristics {
            name: "Enrich",
            quality: QualityLevel::High,
            relative_memory_cost: 0.4,
            relative_compute_cost: 0.7,
            requires_llm: true,
            recommended_use_cases: vec!["image-heavy pages", "documents with many sections"],
        }
    }

    async fn reconstruct(
        &self,
        content: &AnalyzedContent,
        params: &HashMap<String, String>,
        completion: Option<&(dyn CompletionBackend)>,
    ) -> WebFluxResult<ReconstructedContent> {
        let image_count = content.images.len();
        let section_count = content.metadata.structure.section_count;
        let prompt = format!(
            "Rewrite the following content, weaving in references to its {image_count} images and {section_count} sections where relevant:\n\n{}",
            content.main_text
        );
        let text = complete_or_unavailable(completion, prompt, params).await?;
        Ok(ReconstructedContent { source_url: content.source_url.clone(), text, variant_used: self.name().to_string(), metadata: HashMap::new() })
    }
}
