//! Quality info produced by the Content Quality Evaluator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Article,
    Blog,
    Documentation,
    Product,
    Forum,
    General,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Blog => "blog",
            ContentType::Documentation => "documentation",
            ContentType::Product => "product",
            ContentType::Forum => "forum",
            ContentType::General => "general",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityInfo {
    pub overall_score: f64,
    pub content_type: ContentType,
    pub language: String,
    pub reading_minutes: u32,
    pub word_count: usize,
    pub has_paywall: bool,
    pub requires_login: bool,
    pub age_restricted: bool,
    pub content_to_html_ratio: f64,
    pub ad_density: f64,
    pub has_structured_data: bool,
    pub has_author: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub has_citations: bool,
    pub is_https: bool,
    pub llm_suitability: f64,
    pub estimated_tokens: usize,
    pub noise_ratio: f64,
}

impl Default for QualityInfo {
    fn default() -> Self {
        Self {
            overall_score: 0.0,
            content_type: ContentType::General,
            language: "en".to_string(),
            reading_minutes: 0,
            word_count: 0,
            has_paywall: false,
            requires_login: false,
            age_restricted: false,
            content_to_html_ratio: 0.0,
            ad_density: 0.0,
            has_structured_data: false,
            has_author: false,
            publish_date: None,
            has_citations: false,
            is_https: false,
            llm_suitability: 0.0,
            estimated_tokens: 0,
            noise_ratio: 0.0,
        }
    }
}
