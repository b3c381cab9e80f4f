//! Reconstruct strategy capability interface: `Name`/characteristics plus
//! `ReconstructAsync`, mirroring the chunking strategy interface.

use crate::capabilities::CompletionBackend;
use crate::error::WebFluxResult;

use super::types::{AnalyzedContent, ReconstructedContent, VariantCharacteristics};

#[async_trait::async_trait]
pub trait ReconstructStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn characteristics(&self) -> VariantCharacteristics;

    async fn reconstruct(
        &self,
        content: &AnalyzedContent,
        params: &std::collections::HashMap<String, String>,
        completion: Option<&(dyn CompletionBackend)>,
    ) -> WebFluxResult<ReconstructedContent>;
}

pub fn by_name(name: &str) -> Option<Box<dyn ReconstructStrategy>> {
    match name {
        "None" => Some(Box::new(super::none::NoneStrategy)),
        "Summarize" => Some(Box::new(super::summarize::SummarizeStrategy)),
        "Expand" => Some(Box::new(super::expand::ExpandStrategy)),
        "Rewrite" => Some(Box::new(super::rewrite::RewriteStrategy)),
        "Enrich" => Some(Box::new(super::enrich::EnrichStrategy)),
        _ => None,
    }
}
