//! Metadata bundle types: basic, OpenGraph, Twitter Cards, Schema.org,
//! Dublin Core, document structure, and accessibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub author: Option<String>,
    pub canonical: Option<String>,
    pub alternates: Vec<AlternateLink>,
    pub lang: Option<String>,
    pub charset: Option<String>,
    pub viewport: Option<String>,
    pub theme_color: Option<String>,
    pub robots: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternateLink {
    pub href: String,
    pub hreflang: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenGraphMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_type: Option<String>,
    pub url: Option<String>,
    pub site_name: Option<String>,
    pub image: Option<String>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwitterMetadata {
    pub card: Option<String>,
    pub site: Option<String>,
    pub creator: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleSchema {
    pub headline: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationSchema {
    pub name: Option<String>,
    pub url: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonSchema {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoftwareSchema {
    pub name: Option<String>,
    pub application_category: Option<String>,
    pub operating_system: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSchema {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSiteSchema {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreadcrumbItem {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// Schema.org structured data, dispatched on the lowercased `@type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaOrgMetadata {
    pub main_entity_type: Option<String>,
    pub article: Option<ArticleSchema>,
    pub organization: Option<OrganizationSchema>,
    pub person: Option<PersonSchema>,
    pub software: Option<SoftwareSchema>,
    pub product: Option<ProductSchema>,
    pub website: Option<WebSiteSchema>,
    pub breadcrumbs: Vec<BreadcrumbItem>,
    pub faq: Vec<FaqItem>,
    pub raw_json_ld: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DublinCoreMetadata {
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub headings: Vec<crate::model::Heading>,
    pub section_count: usize,
    pub paragraph_count: usize,
    pub link_count: usize,
    pub image_count: usize,
    pub table_count: usize,
    pub list_count: usize,
    pub code_block_count: usize,
    pub reading_time_minutes: u32,
    pub complexity_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessibilityInfo {
    pub alt_text_coverage: f64,
    pub heading_hierarchy_valid: bool,
    pub has_skip_nav: bool,
    pub aria_usage_score: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataBundle {
    pub basic: BasicMetadata,
    pub open_graph: OpenGraphMetadata,
    pub twitter: TwitterMetadata,
    pub schema_org: SchemaOrgMetadata,
    pub dublin_core: DublinCoreMetadata,
    pub structure: DocumentStructure,
    pub accessibility: AccessibilityInfo,
    pub quality_score: f64,
}
