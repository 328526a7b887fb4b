//! # Top Growth Markets Handler
//!
//! Ranks markets by year-over-year revenue growth and keeps the top K.
//!
//! - K comes from "top N" in the question (digits or number words); absent
//!   or zero means [`DEFAULT_TOP_K`], more than the number of markets means
//!   all of them.
//! - Ranking is by growth rate descending, ties by market code ascending.
//! - Channel and pack mentions narrow the revenue being compared; market
//!   mentions restrict the ranking to those markets.

use serde_json::json;

use super::format::{join_and, money, rank_label, round_to, signed_pct};
use super::{
    growth_by, growth_sql, no_match, not_enough_history, query_details, resolve_top_k,
    GrowthWindows, RecordFilter, SALES_FACTS_SOURCE,
};
use crate::chart::ChartRequest;
use crate::data::Dataset;
use crate::nlu::{Intent, Question};
use crate::response::{Kpis, PartialResult, Row};

/// Markets listed when the question names no count.
pub const DEFAULT_TOP_K: usize = 3;

pub fn handle(dataset: &Dataset, question: &Question) -> PartialResult {
    let filter = RecordFilter::from_params(&question.params);
    let Some(windows) = GrowthWindows::of(dataset) else {
        return not_enough_history(Intent::TopGrowthMarkets);
    };

    let mut ranked = growth_by(dataset, windows, &filter, |r| r.market);
    if ranked.is_empty() {
        return no_match(Intent::TopGrowthMarkets, &filter, &windows.label());
    }
    let k = resolve_top_k(question.params.top_k, DEFAULT_TOP_K, ranked.len());
    ranked.truncate(k);

    let listing: Vec<String> = ranked
        .iter()
        .map(|g| format!("{} ({})", g.key, signed_pct(g.growth_rate)))
        .collect();
    let headline = match k {
        1 => format!(
            "Top growth market for {}: {} year over year, {}",
            filter.scope(),
            listing[0],
            windows.label()
        ),
        _ => format!(
            "Top {k} growth markets for {}: {}, {}",
            filter.scope(),
            join_and(&listing),
            windows.label()
        ),
    };

    let mut kpis = Kpis::new();
    for (i, g) in ranked.iter().enumerate() {
        kpis.insert(
            rank_label(i + 1, "Market"),
            json!(format!("{} ({})", g.key, signed_pct(g.growth_rate))),
        );
    }

    let table: Vec<Row> = ranked
        .iter()
        .map(|g| {
            let mut row = Row::new();
            row.insert("market".into(), json!(g.key));
            row.insert("growth_rate".into(), json!(g.growth_rate));
            row.insert("revenue".into(), json!(round_to(g.revenue, 2)));
            row
        })
        .collect();

    let chart = ChartRequest::bar(
        "growth-markets",
        ranked.iter().map(|g| g.growth_rate).collect(),
    );

    tracing::debug!(
        k,
        leader = ranked[0].key,
        leader_revenue = %money(ranked[0].revenue),
        "growth markets ranked"
    );

    PartialResult {
        intent: Intent::TopGrowthMarkets,
        headline,
        kpis: Some(kpis),
        table: Some(table),
        chart: Some(chart),
        details: Some(query_details(
            SALES_FACTS_SOURCE,
            format!("{} (year over year)", windows.label()),
            &filter,
            Vec::new(),
            growth_sql(windows, "market", &filter).limit(k),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_dataset, MARKETS};
    use crate::nlu::NluPipeline;

    fn run(q: &str) -> PartialResult {
        let question = NluPipeline::new().analyze(q);
        handle(&generate_dataset(None), &question)
    }

    fn rows(result: &PartialResult) -> Vec<(String, f64)> {
        result
            .table
            .as_ref()
            .unwrap()
            .iter()
            .map(|row| {
                (
                    row["market"].as_str().unwrap().to_string(),
                    row["growth_rate"].as_f64().unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn top_three_by_default() {
        let result = run("Which markets have the fastest growing sales?");
        let rows = rows(&result);
        assert_eq!(rows.len(), DEFAULT_TOP_K);
        assert!(rows.windows(2).all(|w| w[0].1 >= w[1].1));
        let kpis = result.kpis.unwrap();
        let labels: Vec<&str> = kpis.keys().map(String::as_str).collect();
        assert_eq!(labels, ["Top Market", "2nd Market", "3rd Market"]);
    }

    #[test]
    fn fast_growers_lead() {
        // IN and BR carry the steepest monthly growth in the generator
        let rows = rows(&run("top 2 growth markets"));
        let leaders: Vec<&str> = rows.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(leaders, ["IN", "BR"]);
    }

    #[test]
    fn k_from_words_and_clamping() {
        assert_eq!(rows(&run("top five growth markets")).len(), 5);
        assert_eq!(rows(&run("top 40 growth markets")).len(), MARKETS.len());
        assert_eq!(rows(&run("top 0 growth markets")).len(), DEFAULT_TOP_K);
        assert_eq!(rows(&run("top 1 growth markets")).len(), 1);
    }

    #[test]
    fn market_mentions_restrict_the_ranking() {
        let rows = rows(&run("Which markets grew fastest, UK or DE?"));
        let mut markets: Vec<&str> = rows.iter().map(|(m, _)| m.as_str()).collect();
        markets.sort_unstable();
        assert_eq!(markets, ["DE", "UK"]);
    }

    #[test]
    fn details_describe_the_query() {
        let details = run("top 3 growth markets in e-commerce").details.unwrap();
        assert_eq!(details.time_range, "2024 vs 2023 (year over year)");
        assert_eq!(details.filters, vec!["Channel: E-commerce"]);
        assert!(details.sql.contains("LIMIT 3"));
        assert!(details.sql.contains("channel = 'ecommerce'"));
    }
}
