//! Content Quality Evaluator heuristics.
//!
//! Pattern-table style grounded on `crawl_engine::content_validator` and the
//! compiled-regex-list idiom from `page_extractor::js_scripts`.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{ContentType, QualityInfo};

const PAYWALL_KEYWORDS: &[&str] = &[
    "subscribe to continue",
    "subscription required",
    "paywall",
    "premium content",
    "become a member",
    "구독", // Korean: subscribe
    "订阅",  // Chinese: subscribe
    "定期購読", // Japanese: subscription
];

const LOGIN_KEYWORDS: &[&str] = &[
    "please log in",
    "please login",
    "sign in to continue",
    "log in to continue",
    "로그인", // Korean: login
    "登录",   // Chinese: login
    "ログイン", // Japanese: login
];

const AGE_KEYWORDS: &[&str] = &["18+", "age verification", "adult content", "must be 21"];

const CITATION_KEYWORDS: &[&str] = &["references", "bibliography", "works cited", "footnotes"];

const AD_INDICATOR_TOKENS: &[&str] = &["advertisement", "sponsored", "ad-container", "ads-by", "promoted"];

static AD_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(ins|iframe)[^>]*(adsense|doubleclick|googlesyndication)[^>]*>").unwrap()
});

const CONTENT_TYPE_PATTERNS: &[(ContentType, &[&str])] = &[
    (ContentType::Documentation, &["docs.", "/docs/", "documentation", "api reference", "readme"]),
    (ContentType::Product, &["/product/", "add to cart", "buy now", "price:", "/shop/"]),
    (ContentType::Forum, &["/forum/", "/thread/", "reply to thread", "posted by"]),
    (ContentType::Blog, &["/blog/", "posted on", "blog post"]),
    (ContentType::Article, &["/article/", "/news/", "byline", "published"]),
];

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

fn detect_language(text: &str) -> &'static str {
    let total = text.chars().count().max(1) as f64;
    let korean = text.chars().filter(|c| ('\u{AC00}'..='\u{D7A3}').contains(c)).count() as f64;
    let chinese = text.chars().filter(|c| ('\u{4E00}'..='\u{9FFF}').contains(c)).count() as f64;
    let japanese = text
        .chars()
        .filter(|c| ('\u{3040}'..='\u{309F}').contains(c) || ('\u{30A0}'..='\u{30FF}').contains(c))
        .count() as f64;

    if korean / total > 0.1 {
        "ko"
    } else if chinese / total > 0.1 {
        "zh"
    } else if japanese / total > 0.1 {
        "ja"
    } else {
        "en"
    }
}

fn classify_content_type(title: &str, main_text: &str, url: &str) -> ContentType {
    let boundary = main_text.char_indices().nth(2000).map(|(i, _)| i).unwrap_or(main_text.len());
    let haystack = format!("{} {} {}", title, &main_text[..boundary], url).to_lowercase();
    for (kind, patterns) in CONTENT_TYPE_PATTERNS {
        if patterns.iter().any(|p| haystack.contains(p)) {
            return *kind;
        }
    }
    ContentType::General
}

fn estimate_tokens(text: &str) -> usize {
    let cjk = text
        .chars()
        .filter(|c| {
            ('\u{4E00}'..='\u{9FFF}').contains(c)
                || ('\u{AC00}'..='\u{D7A3}').contains(c)
                || ('\u{3040}'..='\u{30FF}').contains(c)
        })
        .count();
    let latin = text.chars().count() - cjk;
    latin / 4 + ((cjk as f64) / 1.5) as usize
}

/// Evaluate content quality from extracted text plus the raw HTML it came from.
pub fn evaluate_quality(
    url: &str,
    html: &str,
    main_text: &str,
    title: Option<&str>,
    has_structured_data: bool,
    heading_count: usize,
) -> QualityInfo {
    let title = title.unwrap_or("");
    let combined_lower = format!("{} {}", html, main_text).to_lowercase();
    let word_count = main_text.split_whitespace().count();

    let has_paywall = PAYWALL_KEYWORDS.iter().any(|k| combined_lower.contains(k))
        || (main_text.len() < 500 && html.to_lowercase().contains("subscribe"));
    let requires_login = LOGIN_KEYWORDS.iter().any(|k| combined_lower.contains(k));
    let age_restricted = AGE_KEYWORDS.iter().any(|k| combined_lower.contains(k));
    let has_citations = CITATION_KEYWORDS.iter().any(|k| combined_lower.contains(k));

    let ad_token_hits: usize = AD_INDICATOR_TOKENS.iter().map(|t| count_occurrences(&combined_lower, t)).sum();
    let ad_element_hits = AD_ELEMENT_RE.find_iter(html).count();
    let ad_density = ((ad_token_hits + ad_element_hits) as f64 / 20.0).min(1.0);

    let content_to_html_ratio = if !main_text.is_empty() && !html.is_empty() {
        (3.0 * main_text.len() as f64 / html.len() as f64).min(1.0)
    } else {
        0.0
    };

    let language = detect_language(main_text).to_string();
    let content_type = classify_content_type(title, main_text, url);
    let estimated_tokens = estimate_tokens(main_text);
    let is_https = url.starts_with("https://");
    let has_author = combined_lower.contains("author") || combined_lower.contains("byline");

    let mut overall = 0.5_f64;
    if has_paywall {
        overall -= 0.3;
    }
    if requires_login {
        overall -= 0.2;
    }
    overall -= 0.2 * ad_density;
    overall += 0.2 * content_to_html_ratio;
    if (100..=5000).contains(&word_count) {
        overall += 0.1;
    } else if word_count > 5000 {
        overall += 0.05;
    }
    if heading_count >= 2 {
        overall += 0.05;
    }
    if has_structured_data {
        overall += 0.05;
    }
    let overall_score = overall.clamp(0.0, 1.0);

    let mut suitability = 0.5_f64;
    suitability += 0.3 * content_to_html_ratio;
    suitability -= 0.2 * ad_density;
    if (500..=3000).contains(&word_count) {
        suitability += 0.2;
    } else if word_count < 500 {
        suitability -= 0.1;
    }
    if estimated_tokens <= 8000 {
        suitability += 0.1;
    } else if estimated_tokens > 32000 {
        suitability -= 0.2;
    }
    let llm_suitability = suitability.clamp(0.0, 1.0);

    QualityInfo {
        overall_score,
        content_type,
        language,
        reading_minutes: ((word_count as f64 / 200.0).ceil() as u32).max(1),
        word_count,
        has_paywall,
        requires_login,
        age_restricted,
        content_to_html_ratio,
        ad_density,
        has_structured_data,
        has_author,
        publish_date: None,
        has_citations,
        is_https,
        llm_suitability,
        estimated_tokens,
        noise_ratio: ad_density,
    }
}
