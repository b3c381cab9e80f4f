//! Summarize: condenses long content. Requires a text-completion backend.

use std::collections::HashMap;

use crate::capabilities::CompletionBackend;
use crate::error::WebFluxResult;

use super::common::complete_or_unavailable;
use super::registry::ReconstructStrategy;
use super::types::{AnalyzedContent, QualityLevel, ReconstructedContent, VariantCharacteristics};

pub struct SummarizeStrategy;

#[async_trait::async_trait]
impl ReconstructStrategy for SummarizeStrategy {
    fn name(&self) -> &'static str {
        "Summarize"
    }

    fn characteristics(&self) -> VariantCharacteristics {
        VariantCharacteristics {
            name: "Summarize",
            quality: QualityLevel::High,
            relative_memory_cost: 0.3,
            relative_compute_cost: 0.6,
            requires_llm: true,
            recommended_use_cases: vec!["very long articles", "reducing noise before chunking"],
        }
    }

    async fn reconstruct(
        &self,
        content: &AnalyzedContent,
        params: &HashMap<String, String>,
        completion: Option<&(dyn CompletionBackend)>,
    ) -> WebFluxResult<ReconstructedContent> {
        let prompt = format!(
            "Summarize the following content, preserving its key facts and structure:\n\n{}",
            content.main_text
        );
        let text = complete_or_unavailable(completion, prompt, params).await?;
        Ok(ReconstructedContent { source_url: content.source_url.clone(), text, variant_used: self.name().to_string(), metadata: HashMap::new() })
    }
}
