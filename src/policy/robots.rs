//! RFC 9309 oriented robots.txt parsing and rule evaluation.
//!
//! Parsing style (line-oriented, `#`-comment stripping, case-insensitive
//! field names) conceptually grounded on the `texting_robots` crate's API
//! shape (`Robot::new`, `.allowed()`, `.delay`, `.sitemaps`), implemented
//! natively here rather than taken as a dependency.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotsRule {
    pub rule_type: RuleType,
    pub pattern: String,
    #[serde(skip)]
    compiled: Option<std::sync::Arc<Regex>>,
}

impl RobotsRule {
    fn new(rule_type: RuleType, pattern: String) -> Self {
        let compiled = compile_pattern(&pattern).ok().map(std::sync::Arc::new);
        Self { rule_type, pattern, compiled }
    }

    fn matches(&self, path: &str) -> bool {
        self.compiled.as_ref().is_some_and(|re| re.is_match(path))
    }
}

/// Converts a robots.txt path pattern to a regex.
///
/// `*` maps to `.*`; a trailing `$` anchors the end of the path instead of
/// being treated as an implicit suffix wildcard (the naive "always append
/// `.*`" approach conflicts with `$` semantics).
fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let (body, anchored_end) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    let mut regex_str = String::from("^");
    for ch in body.chars() {
        if ch == '*' {
            regex_str.push_str(".*");
        } else {
            regex_str.push_str(&regex::escape(&ch.to_string()));
        }
    }
    if anchored_end {
        regex_str.push('$');
    } else {
        regex_str.push_str(".*");
    }

    Regex::new(&format!("(?i){regex_str}"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRate {
    pub requests: u32,
    pub window_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitTimeWindow {
    pub start_minute_utc: u32,
    pub end_minute_utc: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentGroup {
    pub agents: Vec<String>,
    pub rules: Vec<RobotsRule>,
    pub crawl_delay: Option<f64>,
    pub request_rate: Option<RequestRate>,
    pub visit_time: Option<VisitTimeWindow>,
}

impl AgentGroup {
    fn matches_agent(&self, agent: &str) -> bool {
        self.agents.iter().any(|a| a.eq_ignore_ascii_case(agent))
    }

    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotsMetadata {
    pub base_url: String,
    pub groups: Vec<AgentGroup>,
    pub preferred_host: Option<String>,
    pub sitemaps: Vec<String>,
}

static CRAWL_DELAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());
static REQUEST_RATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)/(\d+)([smh])?$").unwrap());
static VISIT_TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})-(\d{2})(\d{2})$").unwrap());

impl RobotsMetadata {
    /// Permissive default policy: no restrictions, no crawl-delay.
    /// Used on 404 / network failure after retries (see §6 wire expectations).
    pub fn permissive(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), groups: Vec::new(), preferred_host: None, sitemaps: Vec::new() }
    }

    /// Conservative disallow-all policy, used on a 5xx after retries.
    pub fn disallow_all(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            groups: vec![AgentGroup {
                agents: vec!["*".to_string()],
                rules: vec![RobotsRule::new(RuleType::Disallow, "/".to_string())],
                crawl_delay: None,
                request_rate: None,
                visit_time: None,
            }],
            preferred_host: None,
            sitemaps: Vec::new(),
        }
    }

    pub fn parse(base_url: impl Into<String>, body: &str) -> Self {
        let base_url = base_url.into();
        let mut groups: Vec<AgentGroup> = Vec::new();
        let mut sitemaps = Vec::new();
        let mut preferred_host = None;

        let mut current_agents: Vec<String> = Vec::new();
        let mut current_rules: Vec<RobotsRule> = Vec::new();
        let mut current_delay: Option<f64> = None;
        let mut current_rate: Option<RequestRate> = None;
        let mut current_visit: Option<VisitTimeWindow> = None;
        let mut in_group = false;
        let mut seen_rule_since_agent = false;

        let flush = |groups: &mut Vec<AgentGroup>,
                     agents: &mut Vec<String>,
                     rules: &mut Vec<RobotsRule>,
                     delay: &mut Option<f64>,
                     rate: &mut Option<RequestRate>,
                     visit: &mut Option<VisitTimeWindow>| {
            if !agents.is_empty() {
                groups.push(AgentGroup {
                    agents: std::mem::take(agents),
                    rules: std::mem::take(rules),
                    crawl_delay: delay.take(),
                    request_rate: rate.take(),
                    visit_time: visit.take(),
                });
            }
        };

        for raw_line in body.lines() {
            let line = match raw_line.split('#').next() {
                Some(s) => s.trim(),
                None => continue,
            };
            if line.is_empty() {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else { continue };
            let field = field.trim().to_lowercase();
            let value = value.trim().to_string();

            match field.as_str() {
                "user-agent" => {
                    if seen_rule_since_agent {
                        flush(&mut groups, &mut current_agents, &mut current_rules, &mut current_delay, &mut current_rate, &mut current_visit);
                        seen_rule_since_agent = false;
                    }
                    current_agents.push(value);
                    in_group = true;
                }
                "disallow" if in_group => {
                    seen_rule_since_agent = true;
                    if !value.is_empty() {
                        current_rules.push(RobotsRule::new(RuleType::Disallow, value));
                    }
                }
                "allow" if in_group => {
                    seen_rule_since_agent = true;
                    if !value.is_empty() {
                        current_rules.push(RobotsRule::new(RuleType::Allow, value));
                    }
                }
                "crawl-delay" if in_group => {
                    seen_rule_since_agent = true;
                    if CRAWL_DELAY_RE.is_match(&value) {
                        current_delay = value.parse().ok();
                    }
                }
                "request-rate" if in_group => {
                    seen_rule_since_agent = true;
                    if let Some(caps) = REQUEST_RATE_RE.captures(&value) {
                        let requests: u32 = caps[1].parse().unwrap_or(1);
                        let window: u32 = caps[2].parse().unwrap_or(1);
                        let unit_secs = match caps.get(3).map(|m| m.as_str()) {
                            Some("m") => 60,
                            Some("h") => 3600,
                            _ => 1,
                        };
                        current_rate = Some(RequestRate { requests, window_secs: window * unit_secs });
                    }
                }
                "visit-time" if in_group => {
                    seen_rule_since_agent = true;
                    if let Some(caps) = VISIT_TIME_RE.captures(&value) {
                        let sh: u32 = caps[1].parse().unwrap_or(0);
                        let sm: u32 = caps[2].parse().unwrap_or(0);
                        let eh: u32 = caps[3].parse().unwrap_or(0);
                        let em: u32 = caps[4].parse().unwrap_or(0);
                        current_visit = Some(VisitTimeWindow { start_minute_utc: sh * 60 + sm, end_minute_utc: eh * 60 + em });
                    }
                }
                "sitemap" => sitemaps.push(value),
                "host" => preferred_host = Some(value),
                _ => {}
            }
        }
        flush(&mut groups, &mut current_agents, &mut current_rules, &mut current_delay, &mut current_rate, &mut current_visit);

        Self { base_url, groups, preferred_host, sitemaps }
    }

    fn group_for(&self, agent: &str) -> Option<&AgentGroup> {
        self.groups
            .iter()
            .find(|g| g.matches_agent(agent))
            .or_else(|| self.groups.iter().find(|g| g.is_wildcard()))
    }

    /// Decision policy for (path, agent): default allow when no rule set
    /// matches. Idempotent (P4) — purely a function of `self` and the
    /// arguments.
    pub fn is_allowed(&self, path: &str, agent: &str) -> bool {
        let Some(group) = self.group_for(agent) else { return true };
        let mut rules: Vec<&RobotsRule> = group.rules.iter().collect();
        rules.sort_by(|a, b| {
            let type_rank = |t: RuleType| if t == RuleType::Allow { 0 } else { 1 };
            type_rank(a.rule_type).cmp(&type_rank(b.rule_type)).then(b.pattern.len().cmp(&a.pattern.len()))
        });
        for rule in rules {
            if rule.matches(path) {
                return rule.rule_type == RuleType::Allow;
            }
        }
        true
    }

    pub fn crawl_delay(&self, agent: &str) -> Option<f64> {
        self.group_for(agent).and_then(|g| g.crawl_delay)
    }

    pub fn request_rate(&self, agent: &str) -> Option<&RequestRate> {
        self.group_for(agent).and_then(|g| g.request_rate.as_ref())
    }

    pub fn visit_time(&self, agent: &str) -> Option<&VisitTimeWindow> {
        self.group_for(agent).and_then(|g| g.visit_time.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s1_private_with_ok_exception() {
        let robots = RobotsMetadata::parse(
            "https://example.com",
            "User-agent: *\nDisallow: /private/\nAllow: /private/ok\nCrawl-delay: 1",
        );
        assert!(!robots.is_allowed("/private/foo", "anybot"));
        assert!(robots.is_allowed("/private/ok/x", "anybot"));
        assert_eq!(robots.crawl_delay("anybot"), Some(1.0));
    }

    #[test]
    fn scenario_s4_longer_allow_wins() {
        let robots = RobotsMetadata::parse("https://example.com", "User-agent: *\nDisallow: /\nAllow: /public/*.html");
        assert!(robots.is_allowed("/public/index.html", "anybot"));
        assert!(!robots.is_allowed("/public/secret", "anybot"));
    }

    #[test]
    fn default_allow_on_empty_ruleset() {
        let robots = RobotsMetadata::parse("https://example.com", "");
        assert!(robots.is_allowed("/anything", "anybot"));
    }

    #[test]
    fn specific_agent_overrides_wildcard() {
        let robots = RobotsMetadata::parse(
            "https://example.com",
            "User-agent: *\nDisallow: /\n\nUser-agent: GoodBot\nDisallow:\nAllow: /",
        );
        assert!(robots.is_allowed("/x", "GoodBot"));
        assert!(!robots.is_allowed("/x", "OtherBot"));
    }

    #[test]
    fn end_anchor_is_honored() {
        let robots = RobotsMetadata::parse("https://example.com", "User-agent: *\nDisallow: /file$");
        assert!(!robots.is_allowed("/file", "anybot"));
        assert!(robots.is_allowed("/file.html", "anybot"));
    }

    #[test]
    fn idempotent_decision() {
        let robots = RobotsMetadata::parse("https://example.com", "User-agent: *\nDisallow: /a");
        let first = robots.is_allowed("/a/b", "x");
        let second = robots.is_allowed("/a/b", "x");
        assert_eq!(first, second);
    }
}
