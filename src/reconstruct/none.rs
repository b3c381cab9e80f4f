//! None: passes content through unchanged. Always available; requires no
//! capability.

use std::collections::HashMap;

use crate::capabilities::CompletionBackend;
use crate::error::WebFluxResult;

use super::registry::ReconstructStrategy;
use super::types::{AnalyzedContent, QualityLevel, ReconstructedContent, VariantCharacteristics};

pub struct NoneStrategy;

#[async_trait::async_trait]
impl ReconstructStrategy for NoneStrategy {
    fn name(&self) -> &'static str {
        "None"
    }

    fn characteristics(&self) -> VariantCharacteristics {
        VariantCharacteristics {
            name: "None",
            quality: QualityLevel::Medium,
            relative_memory_cost: 0.0,
            relative_compute_cost: 0.0,
            requires_llm: false,
            recommended_use_cases: vec!["content already well-formed", "no completion backend configured"],
        }
    }

    async fn reconstruct(
        &self,
        content: &AnalyzedContent,
        _params: &HashMap<String, String>,
        _completion: Option<&(dyn CompletionBackend)>,
    ) -> WebFluxResult<ReconstructedContent> {
        Ok(ReconstructedContent {
            source_url: content.source_url.clone(),
            text: content.main_text.clone(),
            variant_used: self.name().to_string(),
            metadata: HashMap::new(),
        })
    }
}
