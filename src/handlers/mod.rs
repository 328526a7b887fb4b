//! # Handlers: One Computation per Intent
//!
//! A handler reads the shared [`Dataset`] and the analyzed [`Question`] and
//! returns a [`PartialResult`]. Handlers are pure: the same dataset and
//! question always give the same result, and the dataset is never mutated.
//!
//! | Intent | Handler | Chart |
//! |--------|---------|-------|
//! | Trend | [`trend`] | line |
//! | TopGrowthMarkets | [`growth`] | bar |
//! | SegmentComparison | [`segment`] | none |
//! | TopOccasions | [`occasions`] | bar |
//! | ChannelGrowthComparison | [`channel`] | bar |
//! | Unknown | [`unknown`] | none |
//!
//! ## Growth Rate
//!
//! One formula serves every growth figure:
//!
//! ```text
//! growth_rate = (revenue(latest 12 months) - revenue(prior 12 months))
//!               / revenue(prior 12 months) * 100        rounded to 0.1
//! ```
//!
//! Groups with no prior revenue have no growth rate and are left out.
//!
//! ## Empty Results
//!
//! When the question's filters leave no records the handler answers with a
//! headline saying so, with no KPIs, table or chart.

pub mod channel;
pub mod format;
pub mod growth;
pub mod occasions;
pub mod segment;
pub mod trend;

use std::collections::BTreeMap;

use crate::data::{Dataset, Period, SalesRecord, MARKETS};
use crate::nlu::{Intent, Question, QuestionParams};
use crate::response::{PartialResult, QueryDetails};
use crate::sql::{SqlSketch, SALES_FACTS};

use format::{channel_name, join_and, pack_name};

/// Headline for questions no rule recognized.
pub const UNKNOWN_HEADLINE: &str = "Sorry, I didn't recognize that question. Try asking about \
sales trends, top growth markets, age-segment repeat rates, consumption occasions, or channel growth.";

/// Data source names listed in query details.
pub const SALES_FACTS_SOURCE: &str = "Insights360 - Sales Facts";
pub const SEGMENT_SOURCE: &str = "Insights360 - Segment Analytics";
pub const RESEARCH_SOURCE: &str = "Past Projects - Consumer Research";

/// Routes to the handler for `intent`.
pub fn handle(intent: Intent, dataset: &Dataset, question: &Question) -> PartialResult {
    match intent {
        Intent::Trend => trend::handle(dataset, question),
        Intent::TopGrowthMarkets => growth::handle(dataset, question),
        Intent::SegmentComparison => segment::handle(dataset, question),
        Intent::TopOccasions => occasions::handle(dataset, question),
        Intent::ChannelGrowthComparison => channel::handle(dataset, question),
        Intent::Unknown => unknown(),
    }
}

/// Fixed answer for unrecognized questions.
pub fn unknown() -> PartialResult {
    PartialResult::headline_only(Intent::Unknown, UNKNOWN_HEADLINE)
}

// ─── filtering ─────────────────────────────────────────────────

/// Dimension filter. An empty list accepts every value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordFilter {
    pub markets: Vec<&'static str>,
    pub channels: Vec<&'static str>,
    pub pack_types: Vec<&'static str>,
}

impl RecordFilter {
    /// Market, channel and pack filters named in the question.
    pub fn from_params(params: &QuestionParams) -> Self {
        Self {
            markets: params.markets.clone(),
            channels: params.channels.clone(),
            pack_types: params.pack_types.clone(),
        }
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        accepts(&self.markets, record.market)
            && accepts(&self.channels, record.channel)
            && accepts(&self.pack_types, record.pack_type)
    }

    /// What the answer is about: "multipack yogurt (E-commerce) in UK".
    pub fn scope(&self) -> String {
        let mut scope = String::new();
        if !self.pack_types.is_empty() {
            scope.push_str(&join_and(&self.pack_types));
            scope.push(' ');
        }
        scope.push_str("yogurt");
        if !self.channels.is_empty() {
            let names: Vec<&str> = self.channels.iter().map(|c| channel_name(c)).collect();
            scope.push_str(&format!(" ({})", join_and(&names)));
        }
        if !self.markets.is_empty() {
            scope.push_str(&format!(" in {}", join_and(&self.markets)));
        }
        scope
    }

    /// Channel and pack filters as detail labels ("Channel: Retail").
    pub fn labels(&self) -> Vec<String> {
        let channels = self.channels.iter().map(|c| format!("Channel: {}", channel_name(c)));
        let packs = self.pack_types.iter().map(|p| format!("Pack: {}", pack_name(p)));
        channels.chain(packs).collect()
    }

    /// Regions for query details.
    pub fn regions(&self) -> Vec<String> {
        if self.markets.is_empty() {
            vec![format!("All markets ({})", MARKETS.join(", "))]
        } else {
            self.markets.iter().map(|m| m.to_string()).collect()
        }
    }

    /// Adds the filter's predicates to a SQL sketch.
    pub fn to_sql(&self, sql: SqlSketch) -> SqlSketch {
        sql.filter_in("market", &self.markets)
            .filter_in("channel", &self.channels)
            .filter_in("pack_type", &self.pack_types)
    }
}

fn accepts(allowed: &[&'static str], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|&a| a == value)
}

/// Headline-only answer for filters that matched nothing.
pub(crate) fn no_match(intent: Intent, filter: &RecordFilter, period: &str) -> PartialResult {
    PartialResult::headline_only(
        intent,
        format!("No sales data matched {} for {period}.", filter.scope()),
    )
}

/// Resolves a requested count: absent or zero means `default`, anything
/// above `available` is clamped.
pub fn resolve_top_k(requested: Option<usize>, default: usize, available: usize) -> usize {
    match requested {
        None | Some(0) => default,
        Some(k) => k,
    }
    .min(available)
}

// ─── growth ────────────────────────────────────────────────────

/// Latest 12 months and the 12 months before.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthWindows {
    pub latest: Period,
    pub prior: Period,
}

impl GrowthWindows {
    /// `None` when the dataset spans fewer than 24 months.
    pub fn of(dataset: &Dataset) -> Option<Self> {
        Some(Self {
            latest: dataset.latest_year()?,
            prior: dataset.prior_year()?,
        })
    }

    /// Both windows as one period.
    pub fn span(&self) -> Period {
        Period {
            start: self.prior.start,
            end: self.latest.end,
        }
    }

    /// "2024 vs 2023".
    pub fn label(&self) -> String {
        format!("{} vs {}", self.latest.label(), self.prior.label())
    }
}

/// Year-over-year growth of one group.
#[derive(Clone, Debug, PartialEq)]
pub struct Growth {
    pub key: &'static str,
    /// Percent, rounded to one decimal.
    pub growth_rate: f64,
    /// Revenue of the latest window.
    pub revenue: f64,
}

/// Growth rate in percent, rounded to one decimal. `None` without prior
/// revenue.
pub fn growth_rate(latest: f64, prior: f64) -> Option<f64> {
    if prior <= 0.0 {
        return None;
    }
    Some(format::round_to((latest - prior) / prior * 100.0, 1))
}

/// Growth per group key, ranked by growth rate descending with ties broken
/// by key ascending.
pub fn growth_by<K>(
    dataset: &Dataset,
    windows: GrowthWindows,
    filter: &RecordFilter,
    key: K,
) -> Vec<Growth>
where
    K: Fn(&SalesRecord) -> &'static str,
{
    let mut latest: BTreeMap<&'static str, f64> = BTreeMap::new();
    let mut prior: BTreeMap<&'static str, f64> = BTreeMap::new();
    for record in dataset.records().iter().filter(|r| filter.matches(r)) {
        if windows.latest.contains(record.month) {
            *latest.entry(key(record)).or_default() += record.revenue;
        } else if windows.prior.contains(record.month) {
            *prior.entry(key(record)).or_default() += record.revenue;
        }
    }

    let mut ranked: Vec<Growth> = latest
        .into_iter()
        .filter_map(|(key, revenue)| {
            let rate = growth_rate(revenue, *prior.get(key)?)?;
            Some(Growth {
                key,
                growth_rate: rate,
                revenue,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.growth_rate
            .total_cmp(&a.growth_rate)
            .then_with(|| a.key.cmp(b.key))
    });
    ranked
}

/// Growth-by-`key` query over both windows. Select aliases are never
/// referenced inside the select list.
pub(crate) fn growth_sql(windows: GrowthWindows, key: &str, filter: &RecordFilter) -> SqlSketch {
    let latest_start = windows.latest.start.format("%Y-%m-%d");
    let latest = format!("SUM(CASE WHEN month >= '{latest_start}' THEN revenue END)");
    let prior = format!("SUM(CASE WHEN month < '{latest_start}' THEN revenue END)");
    filter
        .to_sql(
            SqlSketch::from(SALES_FACTS)
                .select(key)
                .select(format!("{latest} AS revenue"))
                .select(format!("{prior} AS prior_revenue"))
                .select(format!(
                    "ROUND(({latest} - {prior}) * 100.0 / {prior}, 1) AS growth_rate"
                ))
                .during(windows.span()),
        )
        .group_by(key)
        .order_by(format!("growth_rate DESC, {key} ASC"))
}

/// Headline-only answer when the span is too short for growth figures.
pub(crate) fn not_enough_history(intent: Intent) -> PartialResult {
    PartialResult::headline_only(
        intent,
        "Not enough history to compare the latest 12 months with the prior 12 months.",
    )
}

// ─── details ───────────────────────────────────────────────────

/// Builds query details from the pieces every handler has.
pub(crate) fn query_details(
    source: &str,
    time_range: String,
    filter: &RecordFilter,
    extra_filters: Vec<String>,
    sql: SqlSketch,
) -> QueryDetails {
    let mut filters = filter.labels();
    filters.extend(extra_filters);
    QueryDetails {
        data_sources: vec![source.to_string()],
        time_range,
        regions: filter.regions(),
        filters,
        sql: sql.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_dataset;
    use crate::nlu::NluPipeline;

    #[test]
    fn unknown_is_headline_only() {
        let result = unknown();
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.headline, UNKNOWN_HEADLINE);
        assert!(result.kpis.is_none() && result.table.is_none());
        assert!(result.chart.is_none() && result.details.is_none());
    }

    #[test]
    fn dispatch_follows_the_given_intent() {
        let ds = generate_dataset(None);
        let q = NluPipeline::new().analyze("asdkjasd");
        assert_eq!(handle(Intent::Trend, &ds, &q).intent, Intent::Trend);
        assert_eq!(handle(Intent::Unknown, &ds, &q).intent, Intent::Unknown);
    }

    #[test]
    fn top_k_resolution() {
        assert_eq!(resolve_top_k(None, 3, 5), 3);
        assert_eq!(resolve_top_k(Some(0), 3, 5), 3);
        assert_eq!(resolve_top_k(Some(4), 3, 5), 4);
        assert_eq!(resolve_top_k(Some(40), 3, 5), 5);
    }

    #[test]
    fn growth_rate_needs_prior_revenue() {
        assert_eq!(growth_rate(110.0, 100.0), Some(10.0));
        assert_eq!(growth_rate(90.0, 100.0), Some(-10.0));
        assert_eq!(growth_rate(10.0, 0.0), None);
    }

    #[test]
    fn growth_by_ranks_with_key_tie_break() {
        let ds = generate_dataset(None);
        let windows = GrowthWindows::of(&ds).unwrap();
        let ranked = growth_by(&ds, windows, &RecordFilter::default(), |r| r.market);
        assert_eq!(ranked.len(), MARKETS.len());
        for pair in ranked.windows(2) {
            assert!(
                pair[0].growth_rate > pair[1].growth_rate
                    || (pair[0].growth_rate == pair[1].growth_rate && pair[0].key < pair[1].key)
            );
        }
    }

    #[test]
    fn filter_scope_and_labels() {
        let filter = RecordFilter {
            markets: vec!["UK"],
            channels: vec!["ecommerce"],
            pack_types: vec!["multipack"],
        };
        assert_eq!(filter.scope(), "multipack yogurt (E-commerce) in UK");
        assert_eq!(filter.labels(), vec!["Channel: E-commerce", "Pack: Multipack"]);
        assert_eq!(filter.regions(), vec!["UK"]);
        assert_eq!(
            RecordFilter::default().regions(),
            vec!["All markets (US, UK, DE, IN, BR)"]
        );
    }

    #[test]
    fn equal_growth_ranks_by_market_name() {
        use crate::data::testing::{dataset, fact, months};

        let span = months(24);
        let mut records = Vec::new();
        for (i, &month) in span.iter().enumerate() {
            let latest = i >= 12;
            // US and BR both grow 10%, DE grows 20%
            records.push(fact(month, "US", "snack", if latest { 110.0 } else { 100.0 }));
            records.push(fact(month, "BR", "snack", if latest { 55.0 } else { 50.0 }));
            records.push(fact(month, "DE", "snack", if latest { 60.0 } else { 50.0 }));
        }
        let ds = dataset(records, span);
        let windows = GrowthWindows::of(&ds).unwrap();

        let ranked = growth_by(&ds, windows, &RecordFilter::default(), |r| r.market);
        let order: Vec<(&str, f64)> = ranked.iter().map(|g| (g.key, g.growth_rate)).collect();
        assert_eq!(order, vec![("DE", 20.0), ("BR", 10.0), ("US", 10.0)]);
    }

    #[test]
    fn growth_sql_repeats_expressions_instead_of_aliases() {
        let ds = generate_dataset(None);
        let windows = GrowthWindows::of(&ds).unwrap();
        let sql = growth_sql(windows, "market", &RecordFilter::default()).to_string();

        let rate_line = sql.lines().find(|l| l.contains("AS growth_rate")).unwrap();
        assert!(!rate_line.contains("prior_revenue"), "{rate_line}");
        assert!(rate_line.contains("SUM(CASE WHEN month < '2024-01-01' THEN revenue END)"));
        assert!(sql.contains("GROUP BY market"));
        assert!(sql.contains("ORDER BY growth_rate DESC, market ASC"));
    }
}
