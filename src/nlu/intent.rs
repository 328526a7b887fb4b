//! # Intent Classifier
//!
//! The [`IntentClassifier`] routes a question to one of a closed set of
//! analytical intents:
//!
//! | Intent | Example |
//! |--------|---------|
//! | [`Trend`](Intent::Trend) | "Show the last 12 months trend" |
//! | [`TopGrowthMarkets`](Intent::TopGrowthMarkets) | "Top 3 growth markets last year?" |
//! | [`SegmentComparison`](Intent::SegmentComparison) | "18-34 vs 35-54 repeat rate?" |
//! | [`TopOccasions`](Intent::TopOccasions) | "Top consumption occasions?" |
//! | [`ChannelGrowthComparison`](Intent::ChannelGrowthComparison) | "Which channel grew faster?" |
//! | [`Unknown`](Intent::Unknown) | anything else |
//!
//! ## Ordered Rules
//!
//! ```text
//! normalized question
//!   ├── rule 1  channel growth    ── match? → ChannelGrowthComparison
//!   ├── rule 2  growth markets    ── match? → TopGrowthMarkets
//!   ├── rule 3  segments          ── match? → SegmentComparison
//!   ├── rule 4  occasions         ── match? → TopOccasions
//!   ├── rule 5  trend             ── match? → Trend
//!   └── no match                  ──────────→ Unknown
//! ```
//!
//! The first matching rule wins, so the more specific patterns sit above the
//! generic ones. The rule table is data ([`RULES`]), not branching.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalize;

/// Analytical intent of a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Trend,
    TopGrowthMarkets,
    SegmentComparison,
    TopOccasions,
    ChannelGrowthComparison,
    /// Nothing matched; the answer is a fixed "not recognized" headline.
    Unknown,
}

impl Intent {
    /// Every member of the closed set.
    pub const ALL: [Intent; 6] = [
        Intent::Trend,
        Intent::TopGrowthMarkets,
        Intent::SegmentComparison,
        Intent::TopOccasions,
        Intent::ChannelGrowthComparison,
        Intent::Unknown,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Trend => "trend",
            Intent::TopGrowthMarkets => "top_growth_markets",
            Intent::SegmentComparison => "segment_comparison",
            Intent::TopOccasions => "top_occasions",
            Intent::ChannelGrowthComparison => "channel_growth_comparison",
            Intent::Unknown => "unknown",
        }
    }

    /// Label shown in the chat UI.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Trend => "Trend",
            Intent::TopGrowthMarkets => "Growth markets",
            Intent::SegmentComparison => "Segment comparison",
            Intent::TopOccasions => "Occasions",
            Intent::ChannelGrowthComparison => "Channel growth",
            Intent::Unknown => "Not recognized",
        }
    }
}

/// Number words accepted wherever a count may appear ("top three").
pub(crate) const COUNT_WORDS: &str =
    r"\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve";

/// Rule table, evaluated top to bottom against the normalized, lower-cased
/// question.
pub const RULES: &[(Intent, &str)] = &[
    (
        Intent::ChannelGrowthComparison,
        r"\bchannels?\b.*\b(grow|grew|growth|growing|faster|fastest)\b|\b(e-?commerce|online)\s+(vs\.?|versus|or)\s+retail\b|\bretail\s+(vs\.?|versus|or)\s+(e-?commerce|online)\b|\b(e-?commerce|online|retail)\b.*\b(grow|grew|growth|growing)\b.*\b(than|vs|versus)\b|\b(e-?commerce|online|retail)\b.*\b(single|multi[\s-]?packs?|shelf[\s-]?stable)\b.*\b(grow|grew|growth|growing|faster)\b",
    ),
    (
        Intent::TopGrowthMarkets,
        r"\btop(\s+(COUNT))?\s+(growth|growing)\b|\bgrowth\s+markets?\b|\bfastest[\s-]+growing\b|\bwhich\s+markets?\b.*\b(grow|grew|growth|growing)\b",
    ),
    (
        Intent::SegmentComparison,
        r"\brepeat(\s+purchase)?\s+rates?\b|\btrial\s+(vs\.?|versus)\s+repeat\b|\b\d{2}\s*-\s*\d{2}\b|\bage\s+(segments?|groups?|buckets?|brackets?)\b",
    ),
    (
        Intent::TopOccasions,
        r"\boccasions?\b|\bwhen\s+do\s+(people|consumers|shoppers)\s+(eat|consume|buy)\b|\bconsumption\s+moments?\b",
    ),
    (
        Intent::Trend,
        r"\btrends?\b|\btrending\b|\b(last|past|trailing)\s+(COUNT)\s+months?\b|\bmonthly\b|\bmonth\s+(by|over)\s+month\b|\bover\s+time\b|\bhow\s+(is|are)\s+.+\s+(doing|performing)\b",
    ),
];

/// One compiled rule.
struct IntentRule {
    intent: Intent,
    pattern: Regex,
}

/// Ordered-rule intent classifier.
///
/// Immutable after construction; pure and thread-safe.
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    /// Compiles [`RULES`].
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|&(intent, pattern)| IntentRule {
                intent,
                pattern: Regex::new(&pattern.replace("COUNT", COUNT_WORDS))
                    .expect("intent rule patterns are valid regexes"),
            })
            .collect();
        Self { rules }
    }

    /// Classifies a raw question. Never fails; unmatched text is
    /// [`Intent::Unknown`].
    pub fn classify(&self, text: &str) -> Intent {
        self.classify_normalized(&normalize(text).to_lowercase())
    }

    /// Classifies text that is already normalized and lower-cased.
    pub(crate) fn classify_normalized(&self, lower: &str) -> Intent {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(lower))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Unknown)
    }

    /// Every intent whose rule matches, in rule order. Useful to audit
    /// precedence when several rules overlap.
    pub fn matching_intents(&self, text: &str) -> Vec<Intent> {
        let lower = normalize(text).to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(&lower))
            .map(|rule| rule.intent)
            .collect()
    }

    /// Rule order as intents.
    pub fn rule_order(&self) -> Vec<Intent> {
        self.rules.iter().map(|rule| rule.intent).collect()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(q: &str) -> Intent {
        IntentClassifier::new().classify(q)
    }

    // ─── routing ───────────────────────────────────────────────

    #[test]
    fn trend_questions() {
        for q in [
            "How is yogurt doing at FreshFoods? Show the last 12 months trend.",
            "Show me the monthly trend",
            "How is yogurt doing",
            "revenue over the past six months",
        ] {
            assert_eq!(classify(q), Intent::Trend, "{q}");
        }
    }

    #[test]
    fn growth_market_questions() {
        for q in [
            "Which were the top 3 growth markets for yogurt last year?",
            "Which markets have the fastest growing sales?",
            "top 3 growth markets",
            "Top five growing markets",
        ] {
            assert_eq!(classify(q), Intent::TopGrowthMarkets, "{q}");
        }
    }

    #[test]
    fn segment_questions() {
        for q in [
            "Among 18–34 vs 35–54, who has higher repeat rate for yogurt?",
            "What is the repeat rate by age segment?",
            "trial vs repeat",
        ] {
            assert_eq!(classify(q), Intent::SegmentComparison, "{q}");
        }
    }

    #[test]
    fn occasion_questions() {
        for q in [
            "What are the top consumption occasions for shelf-stable yogurt?",
            "When do people consume yogurt?",
            "consumption occasions",
        ] {
            assert_eq!(classify(q), Intent::TopOccasions, "{q}");
        }
    }

    #[test]
    fn channel_questions() {
        for q in [
            "In e-commerce vs retail, which channel grew faster for multipack yogurt?",
            "ecommerce single pack growth",
            "which channel grew faster",
            "Is e-commerce growing faster than retail?",
            "retail multipack growth",
        ] {
            assert_eq!(classify(q), Intent::ChannelGrowthComparison, "{q}");
        }
    }

    // ─── precedence ────────────────────────────────────────────

    #[test]
    fn rule_order_is_specific_to_generic() {
        assert_eq!(
            IntentClassifier::new().rule_order(),
            vec![
                Intent::ChannelGrowthComparison,
                Intent::TopGrowthMarkets,
                Intent::SegmentComparison,
                Intent::TopOccasions,
                Intent::Trend,
            ]
        );
    }

    #[test]
    fn growth_markets_win_over_trend() {
        let q = "Show the trend of the top 3 growth markets";
        let matches = IntentClassifier::new().matching_intents(q);
        assert_eq!(matches, vec![Intent::TopGrowthMarkets, Intent::Trend]);
        assert_eq!(classify(q), Intent::TopGrowthMarkets);
    }

    #[test]
    fn channel_and_pack_words_alone_do_not_mean_channel_growth() {
        assert_eq!(
            classify("Show the monthly trend for retail multipack yogurt"),
            Intent::Trend
        );
        assert_eq!(
            classify("Which were the top 3 growth markets for e-commerce multipack yogurt?"),
            Intent::TopGrowthMarkets
        );
        assert_eq!(classify("How is online single pack doing?"), Intent::Trend);
    }

    #[test]
    fn year_ranges_are_not_age_segments() {
        assert_eq!(classify("sales trend 2023-2024"), Intent::Trend);
    }

    // ─── edge cases ────────────────────────────────────────────

    #[test]
    fn degenerate_input_is_unknown() {
        for q in ["", "   ", "?!.,;", "asdkjasd", "42", "top 3"] {
            assert_eq!(classify(q), Intent::Unknown, "{q:?}");
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("MONTHLY TREND"), Intent::Trend);
    }

    #[test]
    fn wire_names_match_serde() {
        for intent in Intent::ALL {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }
}
