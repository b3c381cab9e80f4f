//! Web app manifest parsing (best-effort; malformed manifests are a soft
//! failure and never abort the crawl).

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MANIFEST_PROBE_PATHS: &[&str] =
    &["/manifest.json", "/manifest.webmanifest", "/app.webmanifest", "/site.webmanifest"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: Option<String>,
    pub icon_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub start_url: Option<String>,
    pub scope: Option<String>,
    pub display: Option<String>,
    pub orientation: Option<String>,
    pub theme_color: Option<String>,
    pub background_color: Option<String>,
    pub lang: Option<String>,
    pub dir: Option<String>,
    pub icons: Vec<ManifestIcon>,
    pub screenshots: Vec<String>,
    pub categories: Vec<String>,
    pub shortcuts: Vec<String>,
    pub related_applications: Vec<String>,
    pub share_target: Option<Value>,
}

fn resolve(base: &str, maybe_relative: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(maybe_relative))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| maybe_relative.to_string())
}

fn string_array(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

/// Parse a manifest JSON object, resolving relative URLs against `base_url`.
/// Returns `None` on malformed JSON — callers treat this as a soft failure.
pub fn parse_manifest(base_url: &str, body: &str) -> Option<Manifest> {
    let value: Value = serde_json::from_str(body).ok()?;

    let icons = value
        .get("icons")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|icon| {
                    let src = icon.get("src")?.as_str()?;
                    Some(ManifestIcon {
                        src: resolve(base_url, src),
                        sizes: icon.get("sizes").and_then(Value::as_str).map(String::from),
                        icon_type: icon.get("type").and_then(Value::as_str).map(String::from),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Manifest {
        name: value.get("name").and_then(Value::as_str).map(String::from),
        short_name: value.get("short_name").and_then(Value::as_str).map(String::from),
        description: value.get("description").and_then(Value::as_str).map(String::from),
        start_url: value.get("start_url").and_then(Value::as_str).map(|s| resolve(base_url, s)),
        scope: value.get("scope").and_then(Value::as_str).map(|s| resolve(base_url, s)),
        display: value.get("display").and_then(Value::as_str).map(String::from),
        orientation: value.get("orientation").and_then(Value::as_str).map(String::from),
        theme_color: value.get("theme_color").and_then(Value::as_str).map(String::from),
        background_color: value.get("background_color").and_then(Value::as_str).map(String::from),
        lang: value.get("lang").and_then(Value::as_str).map(String::from),
        dir: value.get("dir").and_then(Value::as_str).map(String::from),
        icons,
        screenshots: string_array(&value, "screenshots"),
        categories: string_array(&value, "categories"),
        shortcuts: string_array(&value, "shortcuts"),
        related_applications: string_array(&value, "related_applications"),
        share_target: value.get("share_target").cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let body = r#"{"name":"App","start_url":"/app","icons":[{"src":"/icon.png","sizes":"192x192"}]}"#;
        let manifest = parse_manifest("https://example.com", body).expect("parses");
        assert_eq!(manifest.name.as_deref(), Some("App"));
        assert_eq!(manifest.start_url.as_deref(), Some("https://example.com/app"));
        assert_eq!(manifest.icons[0].src, "https://example.com/icon.png");
    }

    #[test]
    fn malformed_manifest_is_soft_failure() {
        assert!(parse_manifest("https://example.com", "{not json").is_none());
    }
}
