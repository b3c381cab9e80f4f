//! Token counter public types: model family, analysis, and statistics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    Gpt3,
    Gpt4,
    Gpt4Turbo,
    Claude,
    Llama2,
    Llama3,
    Generic,
}

impl ModelFamily {
    pub fn from_model_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("gpt-4-turbo") || lower.contains("gpt4-turbo") {
            ModelFamily::Gpt4Turbo
        } else if lower.contains("gpt-4") || lower.contains("gpt4") {
            ModelFamily::Gpt4
        } else if lower.contains("gpt-3") || lower.contains("gpt3") {
            ModelFamily::Gpt3
        } else if lower.contains("claude") {
            ModelFamily::Claude
        } else if lower.contains("llama-3") || lower.contains("llama3") {
            ModelFamily::Llama3
        } else if lower.contains("llama-2") || lower.contains("llama2") {
            ModelFamily::Llama2
        } else {
            ModelFamily::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Gpt3 => "gpt-3",
            ModelFamily::Gpt4 => "gpt-4",
            ModelFamily::Gpt4Turbo => "gpt-4-turbo",
            ModelFamily::Claude => "claude",
            ModelFamily::Llama2 => "llama-2",
            ModelFamily::Llama3 => "llama-3",
            ModelFamily::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTokenCount {
    pub model: String,
    pub tokens: usize,
    pub estimated_cost_usd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAnalysis {
    pub char_count: usize,
    pub per_model: Vec<ModelTokenCount>,
    pub compression_ratios: Vec<(String, f64)>,
    pub recommended_model: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelStatistics {
    pub requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_tokens: u64,
}

impl ModelStatistics {
    pub fn mean_tokens_per_request(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.total_tokens as f64 / self.requests as f64
        }
    }
}
