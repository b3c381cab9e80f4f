//! Factory: resolves a `ReconstructOptions` into a concrete strategy,
//! honoring explicit pins, the "Auto" heuristic cascade, and the
//! capability-degradation policy from the error handling design.

use crate::capabilities::CompletionBackend;
use crate::config::ReconstructOptions;
use crate::error::{WebFluxError, WebFluxResult};

use super::none::NoneStrategy;
use super::registry::{by_name, ReconstructStrategy};
use super::types::AnalyzedContent;

const LENGTH_SUMMARIZE_THRESHOLD: usize = 10_000;
const QUALITY_REWRITE_THRESHOLD: f64 = 0.6;
const LENGTH_EXPAND_THRESHOLD: usize = 500;
const SECTION_ENRICH_THRESHOLD: usize = 5;

fn auto_select(content: &AnalyzedContent) -> &'static str {
    let length = content.main_text.chars().count();
    let section_count = content.metadata.structure.section_count;
    let has_images = !content.images.is_empty();

    if length > LENGTH_SUMMARIZE_THRESHOLD {
        "Summarize"
    } else if content.quality.overall_score < QUALITY_REWRITE_THRESHOLD {
        "Rewrite"
    } else if length < LENGTH_EXPAND_THRESHOLD {
        "Expand"
    } else if has_images || section_count > SECTION_ENRICH_THRESHOLD {
        "Enrich"
    } else {
        "Rewrite"
    }
}

/// Resolves `options` against `content` and the availability of
/// `completion`, returning the strategy to run.
///
/// - A concrete variant name is honored as a pin: if the capability is
///   absent, the caller's `require_capability` flag decides whether this is
///   a hard failure or a logged degrade to `None`.
/// - "Auto" (or empty) degrades to `None` outright when the capability is
///   absent or the caller opted out via `use_llm = false`; otherwise the
///   heuristic cascade above picks a variant.
pub fn resolve_strategy(
    content: &AnalyzedContent,
    options: &ReconstructOptions,
    completion: Option<&(dyn CompletionBackend)>,
) -> WebFluxResult<Box<dyn ReconstructStrategy>> {
    let requested = options.strategy();
    let capability_present = completion.is_some();

    if requested.is_empty() || requested.eq_ignore_ascii_case("auto") {
        if !capability_present || !options.use_llm() {
            return Ok(Box::new(NoneStrategy));
        }
        let chosen = auto_select(content);
        return Ok(by_name(chosen).expect("auto_select only returns registered variant names"));
    }

    match by_name(requested) {
        Some(strategy) if strategy.name() == "None" => Ok(strategy),
        Some(strategy) => {
            if capability_present {
                Ok(strategy)
            } else {
                log::warn!("reconstruct variant '{requested}' was pinned but no completion backend is configured; URL fails");
                Err(WebFluxError::CapabilityUnavailable(format!("pinned reconstruct variant '{requested}' has no completion backend")))
            }
        }
        None => {
            log::warn!("unknown reconstruct variant '{requested}'; falling back to None");
            Ok(Box::new(NoneStrategy))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract_metadata;
    use crate::quality::evaluate_quality;
    use std::collections::HashMap as Map;

    fn content_of_length(chars: usize) -> AnalyzedContent {
        let text: String = std::iter::repeat('a').take(chars).collect();
        let metadata = extract_metadata(&text, &text);
        let quality = evaluate_quality("https://example.com", &text, &text, None, false, 0);
        AnalyzedContent {
            source_url: "https://example.com".to_string(),
            raw_html: text.clone(),
            main_text: text,
            title: None,
            headings: Vec::new(),
            images: Vec::new(),
            links: Vec::new(),
            metadata,
            language: "en".to_string(),
            quality,
        }
    }

    fn opts(strategy: &str, use_llm: bool) -> ReconstructOptions {
        crate::config::ReconstructOptionsBuilder::new().strategy(strategy).use_llm(use_llm).build()
    }

    struct StubCompletion;

    #[async_trait::async_trait]
    impl CompletionBackend for StubCompletion {
        async fn complete(&self, _prompt: &str, _params: &Map<String, String>) -> WebFluxResult<String> {
            Ok("stubbed".to_string())
        }
    }

    #[test]
    fn auto_without_capability_degrades_to_none() {
        let content = content_of_length(50);
        let options = opts("Auto", true);
        let strategy = resolve_strategy(&content, &options, None).unwrap();
        assert_eq!(strategy.name(), "None");
    }

    #[test]
    fn auto_long_text_picks_summarize() {
        let content = content_of_length(LENGTH_SUMMARIZE_THRESHOLD + 1);
        let options = opts("Auto", true);
        let completion = StubCompletion;
        let strategy = resolve_strategy(&content, &options, Some(&completion)).unwrap();
        assert_eq!(strategy.name(), "Summarize");
    }

    #[test]
    fn pinned_variant_without_capability_fails() {
        let content = content_of_length(50);
        let options = opts("Rewrite", true);
        let result = resolve_strategy(&content, &options, None);
        assert!(matches!(result, Err(WebFluxError::CapabilityUnavailable(_))));
    }

    #[test]
    fn use_llm_false_degrades_to_none_even_with_capability() {
        let content = content_of_length(50);
        let options = opts("Auto", false);
        let completion = StubCompletion;
        let strategy = resolve_strategy(&content, &options, Some(&completion)).unwrap();
        assert_eq!(strategy.name(), "None");
    }
}
