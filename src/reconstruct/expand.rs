//! Expand: adds context and detail to thin content. Requires a
//! text-completion backend.

use std::collections::HashMap;

use crate::capabilities::CompletionBackend;
use crate::error::WebFluxResult;

use super::common::complete_or_unavailable;
use super::registry::ReconstructStrategy;
use super::types::{AnalyzedContent, QualityLevel, ReconstructedContent, VariantCharacteristics};

pub struct ExpandStrategy;

#[async_trait::async_trait]
impl ReconstructStrategy for ExpandStrategy {
    fn name(&self) -> &'static str {
        "Expand"
    }

    fn characteristics(&self) -> VariantCharacteristics {
        VariantCharacteristics {
            name: "Expand",
            quality: QualityLevel::Medium,
            relative_memory_cost: 0.2,
            relative_compute_cost: 0.5,
            requires_llm: true,
            recommended_use_cases: vec!["short snippets", "thin pages lacking standalone context"],
        }
    }

    async fn reconstruct(
        &self,
        content: &AnalyzedContent,
        params: &HashMap<String, String>,
        completion: Option<&(dyn CompletionBackend)>,
    ) -> WebFluxResult<ReconstructedContent> {
        let prompt = format!(
            "Expand the following short content with relevant context and detail, without inventing facts:\n\n{}",
            content.main_text
        );
        let text = complete_or_unavailable(completion, prompt, params).await?;
        Ok(ReconstructedContent { source_url: content.source_url.clone(), text, variant_used: self.name().to_string(), metadata: HashMap::new() })
    }
}
