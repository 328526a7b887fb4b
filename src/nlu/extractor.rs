//! # Parameter Extractor
//!
//! The [`ParamExtractor`] pulls the parameters a handler needs out of the
//! question text. Everything is optional: a missing or malformed parameter is
//! simply absent and the handler falls back to its documented default.
//!
//! | Parameter | Pattern | Example |
//! |-----------|---------|---------|
//! | `top_k` | `top N` (digits or one…twelve) | "top 3", "top five" |
//! | `trailing_months` | `last/past/trailing N months` | "last 6 months" |
//! | `year` | a single `20NN` | "in 2023" |
//! | `markets` | country names, upper-case codes | "Brazil", "UK" |
//! | `channels` | e-commerce/online, retail | "e-commerce vs retail" |
//! | `pack_types` | single, multipack, shelf-stable | "multi-pack" |
//! | `age_segments` | `NN-NN`, `NN to NN` | "18–34" |
//! | `metric` | repeat, units/volume, revenue/sales | "units sold" |
//!
//! Market codes are matched on the original casing so the pronoun "us" or
//! the preposition "in" never select a market. In an all-caps question the
//! codes that are also English words (`IN`, `US`) are ignored; full names
//! ("India", "United States") still work there.

use regex::Regex;

use super::intent::COUNT_WORDS;
use crate::data::{Metric, AGE_SEGMENTS, MARKETS};

/// Parameters found in a question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionParams {
    pub top_k: Option<usize>,
    pub trailing_months: Option<usize>,
    /// Set only when exactly one distinct year is mentioned.
    pub year: Option<i32>,
    pub markets: Vec<&'static str>,
    pub channels: Vec<&'static str>,
    pub pack_types: Vec<&'static str>,
    /// Known segments, in the order they appear in the question.
    pub age_segments: Vec<&'static str>,
    pub metric: Option<Metric>,
}

/// Regex-driven parameter extractor, compiled once.
pub struct ParamExtractor {
    top_k_re: Regex,
    trailing_re: Regex,
    year_re: Regex,
    segment_re: Regex,
    market_code_re: Regex,
    /// (pattern on lower-cased text, canonical market)
    market_names: Vec<(Regex, &'static str)>,
    channels: Vec<(Regex, &'static str)>,
    pack_types: Vec<(Regex, &'static str)>,
    metrics: Vec<(Regex, Metric)>,
}

impl ParamExtractor {
    pub fn new() -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("extractor patterns are valid regexes");
        Self {
            top_k_re: re(format!(r"\btop\s+({COUNT_WORDS})\b").as_str()),
            trailing_re: re(
                format!(r"\b(?:last|past|trailing)\s+({COUNT_WORDS})\s+months?\b").as_str(),
            ),
            year_re: re(r"\b(20\d{2})\b"),
            segment_re: re(r"\b(\d{2})\s*(?:-|to)\s*(\d{2})\b"),
            market_code_re: re(r"\b(US|USA|UK|DE|IN|BR)\b"),
            market_names: vec![
                (re(r"\b(united\s+states|america)\b"), "US"),
                (re(r"\b(united\s+kingdom|britain|england)\b"), "UK"),
                (re(r"\bgermany\b"), "DE"),
                (re(r"\bindia\b"), "IN"),
                (re(r"\bbrazil\b"), "BR"),
            ],
            channels: vec![
                (re(r"\bretail\b"), "retail"),
                (re(r"\b(e-?commerce|online)\b"), "ecommerce"),
            ],
            pack_types: vec![
                (re(r"\bsingles?(?:[\s-]?(?:packs?|serves?))?\b"), "single"),
                (re(r"\bmulti[\s-]?packs?\b"), "multipack"),
                (re(r"\b(shelf[\s-]?stable|ambient)\b"), "shelf-stable"),
            ],
            metrics: vec![
                (re(r"\brepeat\b"), Metric::RepeatRate),
                (re(r"\b(units?|volumes?)\b"), Metric::Units),
                (re(r"\b(revenue|sales|dollars?|usd)\b"), Metric::Revenue),
            ],
        }
    }

    /// Extracts parameters.
    ///
    /// `text` is the normalized question in its original casing, `lower` the
    /// same text lower-cased.
    pub fn extract(&self, text: &str, lower: &str) -> QuestionParams {
        QuestionParams {
            top_k: self.capture_count(&self.top_k_re, lower),
            trailing_months: self.capture_count(&self.trailing_re, lower),
            year: self.single_year(lower),
            markets: self.markets(text, lower),
            channels: matches_in_order(&self.channels, lower),
            pack_types: matches_in_order(&self.pack_types, lower),
            age_segments: self.age_segments(lower),
            metric: self
                .metrics
                .iter()
                .find(|(re, _)| re.is_match(lower))
                .map(|&(_, metric)| metric),
        }
    }

    fn capture_count(&self, re: &Regex, lower: &str) -> Option<usize> {
        re.captures(lower)
            .and_then(|cap| cap.get(1))
            .and_then(|m| parse_count(m.as_str()))
    }

    fn single_year(&self, lower: &str) -> Option<i32> {
        let mut years: Vec<i32> = self
            .year_re
            .captures_iter(lower)
            .filter_map(|cap| cap.get(1)?.as_str().parse().ok())
            .collect();
        years.sort_unstable();
        years.dedup();
        match years.as_slice() {
            [year] => Some(*year),
            _ => None,
        }
    }

    fn markets(&self, text: &str, lower: &str) -> Vec<&'static str> {
        let shouting = !text.chars().any(char::is_lowercase);
        let mut found = Vec::new();
        for cap in self.market_code_re.captures_iter(text) {
            let code = match &cap[1] {
                "IN" | "US" if shouting => continue,
                "USA" => "US",
                other => other,
            };
            if let Some(&market) = MARKETS.iter().find(|&&m| m == code) {
                push_unique(&mut found, market);
            }
        }
        for &(ref re, market) in &self.market_names {
            if re.is_match(lower) {
                push_unique(&mut found, market);
            }
        }
        found
    }

    fn age_segments(&self, lower: &str) -> Vec<&'static str> {
        let mut found = Vec::new();
        for cap in self.segment_re.captures_iter(lower) {
            let label = format!("{}-{}", &cap[1], &cap[2]);
            if let Some(&segment) = AGE_SEGMENTS.iter().find(|&&s| s == label) {
                push_unique(&mut found, segment);
            }
        }
        found
    }
}

impl Default for ParamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a count written as digits or as a word (one…twelve).
///
/// Digit strings too large for `usize` yield `None`.
pub fn parse_count(token: &str) -> Option<usize> {
    const WORDS: [&str; 12] = [
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
        "twelve",
    ];
    token.parse().ok().or_else(|| {
        WORDS
            .iter()
            .position(|&w| w == token)
            .map(|i| i + 1)
    })
}

fn matches_in_order(table: &[(Regex, &'static str)], lower: &str) -> Vec<&'static str> {
    let mut hits: Vec<(usize, &'static str)> = table
        .iter()
        .filter_map(|(re, value)| re.find(lower).map(|m| (m.start(), *value)))
        .collect();
    hits.sort_by_key(|&(pos, _)| pos);
    hits.into_iter().map(|(_, value)| value).collect()
}

fn push_unique(values: &mut Vec<&'static str>, value: &'static str) {
    if !values.contains(&value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::normalize;

    fn extract(q: &str) -> QuestionParams {
        let text = normalize(q);
        let lower = text.to_lowercase();
        ParamExtractor::new().extract(&text, &lower)
    }

    // ─── counts ────────────────────────────────────────────────

    #[test]
    fn top_k_digits_and_words() {
        assert_eq!(extract("top 3 growth markets").top_k, Some(3));
        assert_eq!(extract("Top five growing markets").top_k, Some(5));
        assert_eq!(extract("growth markets").top_k, None);
    }

    #[test]
    fn huge_count_is_ignored() {
        assert_eq!(extract("top 99999999999999999999999 markets").top_k, None);
    }

    #[test]
    fn trailing_months() {
        assert_eq!(extract("Show the last 12 months trend").trailing_months, Some(12));
        assert_eq!(extract("past six months").trailing_months, Some(6));
        assert_eq!(extract("monthly trend").trailing_months, None);
    }

    #[test]
    fn single_year_only() {
        assert_eq!(extract("trend in 2023").year, Some(2023));
        assert_eq!(extract("2023 vs 2024").year, None);
    }

    // ─── categories ────────────────────────────────────────────

    #[test]
    fn segments_with_en_dash() {
        let params = extract("Among 18–34 vs 35–54, who has higher repeat rate?");
        assert_eq!(params.age_segments, vec!["18-34", "35-54"]);
        assert_eq!(params.metric, Some(Metric::RepeatRate));
    }

    #[test]
    fn segments_keep_question_order() {
        assert_eq!(extract("35 to 54 or 18-34?").age_segments, vec!["35-54", "18-34"]);
    }

    #[test]
    fn unknown_segment_is_dropped() {
        assert!(extract("repeat rate for 55-64").age_segments.is_empty());
    }

    #[test]
    fn market_codes_need_upper_case() {
        assert_eq!(extract("Tell us how the UK is doing").markets, vec!["UK"]);
        assert!(extract("sales in retail for us").markets.is_empty());
        assert_eq!(extract("Brazil and Germany").markets, vec!["DE", "BR"]);
    }

    #[test]
    fn all_caps_words_are_not_market_codes() {
        assert!(extract("HOW IS YOGURT DOING IN 2024? SHOW THE TREND").markets.is_empty());
        assert!(extract("TELL US THE TREND").markets.is_empty());
        assert_eq!(extract("UK TREND IN 2024").markets, vec!["UK"]);
        assert_eq!(extract("TREND FOR INDIA AND THE USA").markets, vec!["US", "IN"]);
        assert_eq!(extract("How is IN doing?").markets, vec!["IN"]);
    }

    #[test]
    fn channels_and_packs() {
        let params = extract("In e-commerce vs retail, which channel grew faster for multipack yogurt?");
        assert_eq!(params.channels, vec!["ecommerce", "retail"]);
        assert_eq!(params.pack_types, vec!["multipack"]);
        assert_eq!(extract("shelf-stable yogurt").pack_types, vec!["shelf-stable"]);
        assert_eq!(extract("ecommerce single pack growth").pack_types, vec!["single"]);
    }

    #[test]
    fn metric_precedence() {
        assert_eq!(extract("units sold by occasion").metric, Some(Metric::Units));
        assert_eq!(extract("sales by occasion").metric, Some(Metric::Revenue));
        assert_eq!(extract("occasions").metric, None);
    }

    #[test]
    fn empty_question_has_no_params() {
        assert_eq!(extract(""), QuestionParams::default());
    }

    #[test]
    fn parse_count_words() {
        assert_eq!(parse_count("twelve"), Some(12));
        assert_eq!(parse_count("7"), Some(7));
        assert_eq!(parse_count("dozen"), None);
    }
}
