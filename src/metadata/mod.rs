//! Metadata Extractor: basic, OpenGraph, Twitter, Schema.org, Dublin Core,
//! document structure, and accessibility signals.

mod extractor;
mod types;

pub use extractor::extract_metadata;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_basic_and_schema_org() {
        let html = r#"
            <html lang="en">
            <head>
                <title>Hello</title>
                <meta name="description" content="a page">
                <link rel="canonical" href="https://example.com/hello">
                <script type="application/ld+json">
                {"@type":"Article","headline":"H","datePublished":"2024-01-02T03:04:05Z","author":{"name":"Ada"}}
                </script>
            </head>
            <body><h1>A</h1><p>one</p><h2>B</h2><p>two</p></body>
            </html>
        "#;
        let bundle = extract_metadata(html, "one two");
        assert_eq!(bundle.basic.title.as_deref(), Some("Hello"));
        assert_eq!(bundle.basic.lang.as_deref(), Some("en"));
        assert_eq!(bundle.schema_org.main_entity_type.as_deref(), Some("Article"));
        let article = bundle.schema_org.article.expect("article present");
        assert_eq!(article.headline.as_deref(), Some("H"));
        assert_eq!(article.author.as_deref(), Some("Ada"));
    }

    #[test]
    fn malformed_json_ld_is_skipped() {
        let html = r#"<html><head><script type="application/ld+json">{not json</script></head><body><p>x</p></body></html>"#;
        let bundle = extract_metadata(html, "x");
        assert!(bundle.schema_org.main_entity_type.is_none());
    }

    #[test]
    fn accessibility_scores_alt_coverage() {
        let html = r#"<html><body><img src="a.png" alt="a"><img src="b.png"></body></html>"#;
        let bundle = extract_metadata(html, "");
        assert!((bundle.accessibility.alt_text_coverage - 0.5).abs() < 1e-9);
    }
}
