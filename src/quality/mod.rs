//! Content Quality Evaluator: paywall/ad/noise/language/type scoring.

mod evaluator;
mod types;

pub use evaluator::evaluate_quality;
pub use types::{ContentType, QualityInfo};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn korean_paywall_scenario() {
        let text = "구독하려면 로그인하세요 ".repeat(40);
        let html = format!("<html><body><p>{text}</p><div class=\"ad-container\"></div></body></html>");
        let info = evaluate_quality("https://example.com/", &html, &text, None, false, 0);
        assert_eq!(info.language, "ko");
        assert!(info.has_paywall);
        assert!(info.requires_login);
    }

    #[test]
    fn ad_density_capped_at_one() {
        let ad = "advertisement ".repeat(200);
        let info = evaluate_quality("https://x.test/", &ad, &ad, None, false, 0);
        assert!(info.ad_density <= 1.0);
    }

    #[test]
    fn long_cjk_text_does_not_panic_at_byte_2000() {
        // Each CJK character is 3 bytes in UTF-8, so a naive byte-2000 slice
        // lands mid-codepoint well before the 700th character.
        let text = "한국어 텍스트입니다 ".repeat(200);
        let info = evaluate_quality("https://example.com/", &text, &text, None, false, 0);
        assert_eq!(info.language, "ko");
    }

    #[test]
    fn content_type_documentation() {
        let text = "API reference for the widget module.";
        let info = evaluate_quality("https://docs.example.com/widget", "<html></html>", text, Some("Docs"), false, 0);
        assert_eq!(info.content_type.as_str(), "documentation");
    }
}
