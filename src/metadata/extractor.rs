//! Metadata extraction: basic, OpenGraph, Twitter, Schema.org, Dublin Core,
//! document structure, and accessibility.
//!
//! Selector style grounded on
//! `content_saver::markdown_converter::html_preprocessing::main_content_extraction`
//! (compile-once `LazyLock<Selector>` statics).

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use crate::model::Heading;

use super::types::*;

static SEL_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static SEL_META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static SEL_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("link").unwrap());
static SEL_HTML: LazyLock<Selector> = LazyLock::new(|| Selector::parse("html").unwrap());
static SEL_JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static SEL_HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static SEL_NAV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("nav, [role='navigation']").unwrap());
static SEL_SKIP_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href^='#']").unwrap());
static SEL_ARIA: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[aria-label], [aria-labelledby], [aria-describedby], [role]").unwrap());
static SEL_IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static SEL_A: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static SEL_P: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static SEL_SECTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("section, article").unwrap());
static SEL_TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static SEL_LIST: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul, ol").unwrap());
static SEL_CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre, code").unwrap());

fn meta_content<'a>(document: &'a Html, attr_name: &str, attr_value: &str) -> Option<String> {
    document.select(&SEL_META).find_map(|el| {
        let value = el.value();
        if value.attr(attr_name)? == attr_value {
            value.attr("content").map(|s| s.to_string())
        } else {
            None
        }
    })
}

fn extract_basic(document: &Html) -> BasicMetadata {
    let title = document
        .select(&SEL_TITLE)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string());

    let description = meta_content(document, "name", "description");
    let keywords = meta_content(document, "name", "keywords")
        .map(|k| k.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let author = meta_content(document, "name", "author");
    let robots = meta_content(document, "name", "robots");
    let charset = document.select(&SEL_META).find_map(|el| el.value().attr("charset").map(|s| s.to_string()));
    let viewport = meta_content(document, "name", "viewport");
    let theme_color = meta_content(document, "name", "theme-color");

    let lang = document
        .select(&SEL_HTML)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(|s| s.to_string());

    let mut canonical = None;
    let mut alternates = Vec::new();
    for el in document.select(&SEL_LINK) {
        let value = el.value();
        match value.attr("rel") {
            Some("canonical") => canonical = value.attr("href").map(|s| s.to_string()),
            Some("alternate") => {
                if let (Some(href), Some(hreflang)) = (value.attr("href"), value.attr("hreflang")) {
                    alternates.push(AlternateLink { href: href.to_string(), hreflang: hreflang.to_string() });
                }
            }
            _ => {}
        }
    }

    BasicMetadata { title, description, keywords, author, canonical, alternates, lang, charset, viewport, theme_color, robots }
}

fn extract_open_graph(document: &Html) -> OpenGraphMetadata {
    let get = |prop: &str| meta_content(document, "property", prop);
    OpenGraphMetadata {
        title: get("og:title"),
        description: get("og:description"),
        og_type: get("og:type"),
        url: get("og:url"),
        site_name: get("og:site_name"),
        image: get("og:image"),
        image_width: get("og:image:width").and_then(|s| s.parse().ok()),
        image_height: get("og:image:height").and_then(|s| s.parse().ok()),
    }
}

/// Scans `<meta name="DC.*">` and `<meta name="dc:*">` tags (both
/// conventions appear in the wild) into a flat `element -> content` map,
/// keyed by the lowercased Dublin Core element name with the prefix
/// stripped (`DC.Creator` and `dc:creator` both key as `creator`).
fn extract_dublin_core(document: &Html) -> DublinCoreMetadata {
    let mut fields = std::collections::HashMap::new();
    for el in document.select(&SEL_META) {
        let value = el.value();
        let Some(name) = value.attr("name") else { continue };
        let element = if let Some(rest) = name.strip_prefix("DC.").or_else(|| name.strip_prefix("DC:")) {
            rest
        } else if let Some(rest) = name.strip_prefix("dc.").or_else(|| name.strip_prefix("dc:")) {
            rest
        } else {
            continue;
        };
        if let Some(content) = value.attr("content") {
            fields.insert(element.to_lowercase(), content.to_string());
        }
    }
    DublinCoreMetadata { fields }
}

fn extract_twitter(document: &Html) -> TwitterMetadata {
    let get = |name: &str| meta_content(document, "name", name);
    TwitterMetadata {
        card: get("twitter:card"),
        site: get("twitter:site"),
        creator: get("twitter:creator"),
        title: get("twitter:title"),
        description: get("twitter:description"),
        image: get("twitter:image"),
    }
}

fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(json_string),
        _ => None,
    }
}

fn parse_schema_object(obj: &Value, out: &mut SchemaOrgMetadata) {
    let Some(type_str) = obj.get("@type").and_then(Value::as_str) else { return };
    let lowered = type_str.to_lowercase();

    if out.main_entity_type.is_none() {
        out.main_entity_type = Some(type_str.to_string());
    }

    if lowered == "article" || lowered == "blogposting" || lowered == "newsarticle" {
        out.article = Some(ArticleSchema {
            headline: obj.get("headline").and_then(Value::as_str).map(String::from),
            date_published: obj
                .get("datePublished")
                .and_then(Value::as_str)
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            date_modified: obj
                .get("dateModified")
                .and_then(Value::as_str)
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            author: obj.get("author").and_then(json_string),
            publisher: obj.get("publisher").and_then(json_string),
        });
    } else if lowered == "organization" {
        out.organization = Some(OrganizationSchema {
            name: obj.get("name").and_then(Value::as_str).map(String::from),
            url: obj.get("url").and_then(Value::as_str).map(String::from),
            logo: obj.get("logo").and_then(json_string),
        });
    } else if lowered == "person" {
        out.person = Some(PersonSchema {
            name: obj.get("name").and_then(Value::as_str).map(String::from),
            url: obj.get("url").and_then(Value::as_str).map(String::from),
        });
    } else if lowered == "softwareapplication" || lowered == "softwarelibrary" {
        out.software = Some(SoftwareSchema {
            name: obj.get("name").and_then(Value::as_str).map(String::from),
            application_category: obj.get("applicationCategory").and_then(Value::as_str).map(String::from),
            operating_system: obj.get("operatingSystem").and_then(Value::as_str).map(String::from),
        });
    } else if lowered == "product" {
        out.product = Some(ProductSchema {
            name: obj.get("name").and_then(Value::as_str).map(String::from),
            brand: obj.get("brand").and_then(json_string),
            price: obj
                .get("offers")
                .and_then(|o| o.get("price"))
                .and_then(Value::as_str)
                .map(String::from),
        });
    } else if lowered == "website" {
        out.website = Some(WebSiteSchema {
            name: obj.get("name").and_then(Value::as_str).map(String::from),
            url: obj.get("url").and_then(Value::as_str).map(String::from),
        });
    } else if lowered == "breadcrumblist" {
        if let Some(items) = obj.get("itemListElement").and_then(Value::as_array) {
            for item in items {
                let name = item.get("name").and_then(Value::as_str).map(String::from)
                    .or_else(|| item.get("item").and_then(|i| i.get("name")).and_then(Value::as_str).map(String::from));
                if let Some(name) = name {
                    out.breadcrumbs.push(BreadcrumbItem {
                        name,
                        url: item.get("item").and_then(|i| i.get("@id").or(i.get("url"))).and_then(Value::as_str).map(String::from),
                    });
                }
            }
        }
    } else if lowered == "faqpage" {
        if let Some(items) = obj.get("mainEntity").and_then(Value::as_array) {
            for item in items {
                if let (Some(q), Some(a)) = (
                    item.get("name").and_then(Value::as_str),
                    item.get("acceptedAnswer").and_then(|a| a.get("text")).and_then(Value::as_str),
                ) {
                    out.faq.push(FaqItem { question: q.to_string(), answer: a.to_string() });
                }
            }
        }
    }
}

fn extract_schema_org(document: &Html) -> SchemaOrgMetadata {
    let mut out = SchemaOrgMetadata::default();
    for el in document.select(&SEL_JSON_LD) {
        let raw = el.text().collect::<String>();
        out.raw_json_ld.push(raw.clone());
        let Ok(value) = serde_json::from_str::<Value>(&raw) else { continue };
        match value {
            Value::Array(items) => {
                for item in items {
                    parse_schema_object(&item, &mut out);
                }
            }
            Value::Object(_) => parse_schema_object(&value, &mut out),
            _ => {}
        }
    }
    out
}

fn extract_headings(document: &Html) -> Vec<Heading> {
    document
        .select(&SEL_HEADINGS)
        .map(|el| {
            let level = el.value().name().chars().nth(1).and_then(|c| c.to_digit(10)).unwrap_or(1) as u8;
            Heading { level, text: el.text().collect::<String>().trim().to_string(), anchor: el.value().attr("id").map(String::from) }
        })
        .collect()
}

fn extract_structure(document: &Html, main_text: &str) -> DocumentStructure {
    let headings = extract_headings(document);
    let word_count = main_text.split_whitespace().count();
    DocumentStructure {
        section_count: document.select(&SEL_SECTION).count(),
        paragraph_count: document.select(&SEL_P).count(),
        link_count: document.select(&SEL_A).count(),
        image_count: document.select(&SEL_IMG).count(),
        table_count: document.select(&SEL_TABLE).count(),
        list_count: document.select(&SEL_LIST).count(),
        code_block_count: document.select(&SEL_CODE).count(),
        reading_time_minutes: ((word_count as f64 / 250.0).ceil() as u32).max(1),
        complexity_score: (headings.len() as f64 / 20.0).min(1.0),
        headings,
    }
}

fn extract_accessibility(document: &Html, structure: &DocumentStructure) -> AccessibilityInfo {
    let total_images = document.select(&SEL_IMG).count();
    let images_with_alt = document
        .select(&SEL_IMG)
        .filter(|el| el.value().attr("alt").is_some_and(|a| !a.trim().is_empty()))
        .count();
    let alt_text_coverage = if total_images == 0 { 1.0 } else { images_with_alt as f64 / total_images as f64 };

    let mut hierarchy_valid = true;
    let mut prev_level: Option<u8> = None;
    for (i, h) in structure.headings.iter().enumerate() {
        if i == 0 && h.level != 1 {
            hierarchy_valid = false;
        }
        if let Some(prev) = prev_level {
            if h.level > prev + 1 {
                hierarchy_valid = false;
            }
        }
        prev_level = Some(h.level);
    }

    let has_skip_nav = document.select(&SEL_SKIP_LINK).next().is_some() || document.select(&SEL_NAV).next().is_some();
    let aria_elements = document.select(&SEL_ARIA).count();
    let aria_usage_score = (aria_elements as f64 / 10.0).min(1.0);

    let score = (40.0 * alt_text_coverage
        + 25.0 * if hierarchy_valid { 1.0 } else { 0.0 }
        + 15.0 * if has_skip_nav { 1.0 } else { 0.0 }
        + 20.0 * aria_usage_score)
        .clamp(0.0, 100.0);

    AccessibilityInfo { alt_text_coverage, heading_hierarchy_valid: hierarchy_valid, has_skip_nav, aria_usage_score, score }
}

fn quality_score(basic: &BasicMetadata, og: &OpenGraphMetadata, schema: &SchemaOrgMetadata, structure: &DocumentStructure, accessibility: &AccessibilityInfo) -> f64 {
    let basic_score = [basic.title.is_some(), basic.description.is_some(), !basic.keywords.is_empty(), basic.author.is_some(), basic.canonical.is_some()]
        .iter()
        .filter(|b| **b)
        .count() as f64
        / 5.0;
    let og_score = [og.title.is_some(), og.description.is_some(), og.image.is_some(), og.og_type.is_some()]
        .iter()
        .filter(|b| **b)
        .count() as f64
        / 4.0;
    let schema_score = if schema.main_entity_type.is_some() { 1.0 } else { 0.0 };
    let structure_score = (structure.headings.len().min(5) as f64 / 5.0).max(if structure.paragraph_count > 0 { 0.3 } else { 0.0 });
    let technical_score = if basic.charset.is_some() && basic.viewport.is_some() { 1.0 } else if basic.charset.is_some() || basic.viewport.is_some() { 0.5 } else { 0.0 };
    let accessibility_score = accessibility.score / 100.0;

    (basic_score * 0.25 + og_score * 0.20 + schema_score * 0.20 + structure_score * 0.15 + technical_score * 0.10 + accessibility_score * 0.10).clamp(0.0, 1.0)
}

/// Extract the full metadata bundle from an HTML document.
///
/// Malformed JSON-LD blocks are skipped silently; extraction never aborts.
pub fn extract_metadata(html: &str, main_text: &str) -> MetadataBundle {
    let document = Html::parse_document(html);

    let basic = extract_basic(&document);
    let open_graph = extract_open_graph(&document);
    let twitter = extract_twitter(&document);
    let schema_org = extract_schema_org(&document);
    let dublin_core = extract_dublin_core(&document);
    let structure = extract_structure(&document, main_text);
    let accessibility = extract_accessibility(&document, &structure);
    let quality_score = quality_score(&basic, &open_graph, &schema_org, &structure, &accessibility);

    MetadataBundle {
        basic,
        open_graph,
        twitter,
        schema_org,
        dublin_core,
        structure,
        accessibility,
        quality_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s3_json_ld_article() {
        let html = r#"
            <html lang="en">
            <head>
                <title>Launch Day</title>
                <script type="application/ld+json">
                {"@type":"Article","headline":"We shipped it","datePublished":"2024-03-01T09:00:00Z","dateModified":"2024-03-02T10:30:00Z","author":{"name":"Ada Lovelace"},"publisher":{"name":"Acme Co"}}
                </script>
            </head>
            <body><h1>We shipped it</h1><p>Details follow.</p></body>
            </html>
        "#;
        let bundle = extract_metadata(html, "We shipped it Details follow.");
        assert_eq!(bundle.schema_org.main_entity_type.as_deref(), Some("Article"));
        let article = bundle.schema_org.article.expect("article schema present");
        assert_eq!(article.headline.as_deref(), Some("We shipped it"));
        assert_eq!(article.author.as_deref(), Some("Ada Lovelace"));
        assert_eq!(article.publisher.as_deref(), Some("Acme Co"));
        assert_eq!(article.date_published.map(|d| d.timestamp()), Some(1709283600));
        assert_eq!(article.date_modified.map(|d| d.timestamp()), Some(1709375400));
    }

    #[test]
    fn dublin_core_reads_both_dot_and_colon_conventions() {
        let html = r#"<html><head>
            <meta name="DC.Creator" content="Grace Hopper">
            <meta name="dc:subject" content="compilers">
        </head><body><p>x</p></body></html>"#;
        let bundle = extract_metadata(html, "x");
        assert_eq!(bundle.dublin_core.fields.get("creator").map(String::as_str), Some("Grace Hopper"));
        assert_eq!(bundle.dublin_core.fields.get("subject").map(String::as_str), Some("compilers"));
    }

    #[test]
    fn dublin_core_absent_is_empty_not_error() {
        let bundle = extract_metadata("<html><body><p>x</p></body></html>", "x");
        assert!(bundle.dublin_core.fields.is_empty());
    }

    #[test]
    fn accessibility_scores_alt_coverage_and_hierarchy() {
        let html = r#"<html><body>
            <nav><a href="#main">Skip to content</a></nav>
            <h1>Top</h1><h2>Sub</h2>
            <img src="a.png" alt="a described image">
            <img src="b.png" alt="">
        </body></html>"#;
        let bundle = extract_metadata(html, "");
        assert!((bundle.accessibility.alt_text_coverage - 0.5).abs() < 1e-9);
        assert!(bundle.accessibility.heading_hierarchy_valid);
        assert!(bundle.accessibility.has_skip_nav);
        assert!(bundle.accessibility.score > 0.0);
    }

    #[test]
    fn accessibility_flags_broken_heading_hierarchy() {
        let html = r#"<html><body><h1>Top</h1><h4>Too deep</h4></body></html>"#;
        let bundle = extract_metadata(html, "");
        assert!(!bundle.accessibility.heading_hierarchy_valid);
    }

    #[test]
    fn quality_score_rewards_richer_metadata() {
        let thin = extract_metadata("<html><body><p>x</p></body></html>", "x");

        let rich_html = r#"
            <html lang="en">
            <head>
                <title>Complete</title>
                <meta charset="utf-8">
                <meta name="viewport" content="width=device-width">
                <meta name="description" content="a thorough page">
                <meta name="author" content="Ada">
                <meta name="keywords" content="a, b">
                <link rel="canonical" href="https://example.com/complete">
                <meta property="og:title" content="Complete">
                <meta property="og:description" content="a thorough page">
                <meta property="og:image" content="https://example.com/img.png">
                <meta property="og:type" content="article">
                <script type="application/ld+json">{"@type":"Article","headline":"Complete"}</script>
            </head>
            <body>
                <h1 id="top">Complete</h1><p>One.</p>
                <h2>Sub</h2><p>Two.</p>
            </body>
            </html>
        "#;
        let rich = extract_metadata(rich_html, "Complete One. Sub Two.");

        assert!(rich.quality_score > thin.quality_score);
    }
}
