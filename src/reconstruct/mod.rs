//! Reconstruct stage: optionally rewrites extracted content through a named
//! variant before it reaches chunking. Mirrors the chunking module's
//! capability-interface-plus-registry shape, with an added factory that
//! resolves "Auto" and capability-absent pins per the error handling design.

mod common;
mod enrich;
mod expand;
mod factory;
mod none;
mod registry;
mod rewrite;
mod summarize;
mod types;

pub use factory::resolve_strategy;
pub use registry::{by_name, ReconstructStrategy};
pub use types::{AnalyzedContent, QualityLevel, ReconstructedContent, VariantCharacteristics};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconstructOptionsBuilder;
    use crate::metadata::extract_metadata;
    use crate::quality::evaluate_quality;
    use crate::capabilities::CompletionBackend;
    use crate::error::WebFluxResult;
    use std::collections::HashMap;

    struct EchoCompletion;

    #[async_trait::async_trait]
    impl CompletionBackend for EchoCompletion {
        async fn complete(&self, prompt: &str, _params: &HashMap<String, String>) -> WebFluxResult<String> {
            Ok(format!("[completed] {prompt}"))
        }
    }

    fn content(main_text: &str) -> AnalyzedContent {
        let metadata = extract_metadata(main_text, main_text);
        let quality = evaluate_quality("https://example.com/a", main_text, main_text, None, false, 0);
        AnalyzedContent {
            source_url: "https://example.com/a".to_string(),
            raw_html: main_text.to_string(),
            main_text: main_text.to_string(),
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
    async fn none_strategy_passes_text_through() {
        let c = content("hello world");
        let options = ReconstructOptionsBuilder::new().strategy("None").use_llm(true).build();
        let strategy = resolve_strategy(&c, &options, None).unwrap();
        let out = strategy.reconstruct(&c, &HashMap::new(), None).await.unwrap();
        assert_eq!(out.text, "hello world");
        assert_eq!(out.variant_used, "None");
    }

    #[tokio::test]
    async fn auto_short_text_with_capability_picks_expand() {
        let c = content("short snippet");
        let options = ReconstructOptionsBuilder::new().strategy("Auto").use_llm(true).build();
        let completion = EchoCompletion;
        let strategy = resolve_strategy(&c, &options, Some(&completion)).unwrap();
        assert_eq!(strategy.name(), "Expand");
        let out = strategy.reconstruct(&c, &HashMap::new(), Some(&completion)).await.unwrap();
        assert!(out.text.starts_with("[completed]"));
    }

    #[test]
    fn by_name_unknown_variant_is_none() {
        assert!(by_name("NotARealVariant").is_none());
    }
}
