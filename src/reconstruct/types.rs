//! Shared reconstruct types: the input/output pair and a characteristics
//! descriptor every variant exposes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ExtractedContent;

/// Content already run through extraction, ready for an optional rewrite
/// pass before chunking. A thin alias over `ExtractedContent` today; kept
/// distinct so the reconstruct stage's input type can diverge from the
/// extractor's output type without a ripple change.
pub type AnalyzedContent = ExtractedContent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructedContent {
    pub source_url: String,
    pub text: String,
    pub variant_used: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantCharacteristics {
    pub name: &'static str,
    pub quality: QualityLevel,
    pub relative_memory_cost: f64,
    pub relative_compute_cost: f64,
    pub requires_llm: bool,
    pub recommended_use_cases: Vec<&'static str>,
}
