//! Extract stage: turns raw HTML into the plain-text, heading, image, and
//! link facts that seed an `ExtractedContent`, ahead of metadata extraction
//! and quality evaluation.
//!
//! Main-content isolation (candidate selectors, excluded-tag walk) is
//! grounded on `chunking::dom_structure`'s `find_main`/`is_excluded`/
//! `collect_text`; selector style otherwise follows `metadata::extractor`'s
//! compile-once `LazyLock<Selector>` statics.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::model::{Heading, ImageRef, LinkRef};

const MAIN_CANDIDATES: &[&str] = &["article", "main", "[role=main]", "#content", ".content"];
const EXCLUDED_TAGS: &[&str] = &["nav", "header", "footer", "aside", "script", "style", "noscript"];

static SEL_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static SEL_BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static SEL_HEADINGS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static SEL_IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static SEL_A: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn is_excluded(elem: &scraper::node::Element) -> bool {
    EXCLUDED_TAGS.contains(&elem.name())
}

fn find_main(document: &Html) -> ElementRef<'_> {
    for candidate in MAIN_CANDIDATES {
        if let Ok(selector) = Selector::parse(candidate) {
            if let Some(elem) = document.select(&selector).next() {
                return elem;
            }
        }
    }
    if let Some(body) = document.select(&SEL_BODY).next() {
        return body;
    }
    document.root_element()
}

fn collect_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    collect_text_into(node, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text_into(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            out.push_str(&text.text);
            out.push(' ');
        }
        Node::Element(elem) if !is_excluded(elem) => {
            for child in node.children() {
                collect_text_into(child, out);
            }
        }
        _ => {}
    }
}

fn resolve(base: &str, href: &str) -> String {
    url::Url::parse(base).and_then(|b| b.join(href)).map(|u| u.to_string()).unwrap_or_else(|_| href.to_string())
}

fn image_format(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('.').next().map(|ext| ext.to_lowercase()).filter(|ext| ext.len() <= 4 && *ext != path.to_lowercase())
}

/// The pieces of `ExtractedContent` that come directly from the HTML:
/// title, main text, heading list, image list, and link list.
pub struct ExtractedFacts {
    pub title: Option<String>,
    pub main_text: String,
    pub headings: Vec<Heading>,
    pub images: Vec<ImageRef>,
    pub links: Vec<LinkRef>,
}

/// Parses `html` (fetched from `source_url`) into the facts needed to build
/// an `ExtractedContent`, ahead of metadata extraction and quality scoring.
pub fn extract_facts(html: &str, source_url: &str) -> ExtractedFacts {
    let document = Html::parse_document(html);

    let title = document.select(&SEL_TITLE).next().map(|el| el.text().collect::<String>().trim().to_string()).filter(|t| !t.is_empty());

    let main = find_main(&document);
    let main_text = collect_text(*main);

    let headings = document
        .select(&SEL_HEADINGS)
        .filter_map(|el| {
            let level = heading_level(el.value().name())?;
            let text = el.text().collect::<String>().trim().to_string();
            if text.is_empty() {
                return None;
            }
            let anchor = el.value().attr("id").map(|s| s.to_string());
            Some(Heading { level, text, anchor })
        })
        .collect();

    let images = document
        .select(&SEL_IMG)
        .enumerate()
        .filter_map(|(position, el)| {
            let src = el.value().attr("src")?;
            let url = resolve(source_url, src);
            let format = image_format(&url);
            let width = el.value().attr("width").and_then(|w| w.parse().ok());
            let height = el.value().attr("height").and_then(|h| h.parse().ok());
            let alt = el.value().attr("alt").map(|s| s.to_string());
            let context = el.parent().and_then(ElementRef::wrap).map(|p| p.text().collect::<String>().trim().to_string()).filter(|c| !c.is_empty());
            Some(ImageRef { url, alt, context, position, format, width, height })
        })
        .collect();

    let links = document
        .select(&SEL_A)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let url = resolve(source_url, href);
            let text = el.text().collect::<String>().trim().to_string();
            let text = if text.is_empty() { None } else { Some(text) };
            let rel = el.value().attr("rel").map(|s| s.to_string());
            Some(LinkRef { url, text, rel })
        })
        .collect();

    ExtractedFacts { title, main_text, headings, images, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_nav_and_script_from_main_text() {
        let html = r#"<html><body>
            <nav>Home About</nav>
            <script>var x = 1;</script>
            <article><p>Real content here.</p></article>
            <footer>copyright</footer>
        </body></html>"#;
        let facts = extract_facts(html, "https://example.com/");
        assert!(facts.main_text.contains("Real content here."));
        assert!(!facts.main_text.contains("Home About"));
        assert!(!facts.main_text.contains("var x"));
        assert!(!facts.main_text.contains("copyright"));
    }

    #[test]
    fn headings_capture_level_text_and_anchor() {
        let html = r#"<html><body><h1 id="top">Title</h1><h2>Sub</h2></body></html>"#;
        let facts = extract_facts(html, "https://example.com/");
        assert_eq!(facts.headings.len(), 2);
        assert_eq!(facts.headings[0].level, 1);
        assert_eq!(facts.headings[0].anchor.as_deref(), Some("top"));
        assert_eq!(facts.headings[1].level, 2);
    }

    #[test]
    fn images_resolve_relative_urls_and_alt_text() {
        let html = r#"<html><body><img src="/a.PNG" alt="An image" width="10" height="20"></body></html>"#;
        let facts = extract_facts(html, "https://example.com/page/");
        assert_eq!(facts.images.len(), 1);
        let img = &facts.images[0];
        assert_eq!(img.url, "https://example.com/a.PNG");
        assert_eq!(img.alt.as_deref(), Some("An image"));
        assert_eq!(img.format.as_deref(), Some("png"));
        assert_eq!(img.width, Some(10));
        assert_eq!(img.height, Some(20));
    }

    #[test]
    fn links_are_resolved_against_source_url() {
        let html = r#"<html><body><a href="/other">Other page</a></body></html>"#;
        let facts = extract_facts(html, "https://example.com/dir/page.html");
        assert_eq!(facts.links.len(), 1);
        assert_eq!(facts.links[0].url, "https://example.com/other");
        assert_eq!(facts.links[0].text.as_deref(), Some("Other page"));
    }

    #[test]
    fn missing_title_is_none() {
        let facts = extract_facts("<html><body><p>x</p></body></html>", "https://example.com/");
        assert!(facts.title.is_none());
    }
}
