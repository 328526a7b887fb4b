//! # Channel Growth Handler
//!
//! Year-over-year revenue growth of retail against e-commerce. Both channels
//! are always compared; pack and market mentions narrow the records.

use serde_json::json;

use super::format::{channel_name, pack_name, round_to, signed_pct};
use super::{
    growth_by, growth_sql, no_match, not_enough_history, query_details, GrowthWindows,
    RecordFilter, SALES_FACTS_SOURCE,
};
use crate::chart::ChartRequest;
use crate::data::{Dataset, CHANNELS, PACK_TYPES};
use crate::nlu::{Intent, Question};
use crate::response::{Kpis, PartialResult, Row};

pub fn handle(dataset: &Dataset, question: &Question) -> PartialResult {
    let filter = RecordFilter {
        channels: Vec::new(),
        ..RecordFilter::from_params(&question.params)
    };
    let Some(windows) = GrowthWindows::of(dataset) else {
        return not_enough_history(Intent::ChannelGrowthComparison);
    };

    let ranked = growth_by(dataset, windows, &filter, |r| r.channel);
    let Some(leader) = ranked.first() else {
        return no_match(Intent::ChannelGrowthComparison, &filter, &windows.label());
    };

    let headline = match ranked.get(1) {
        Some(other) if other.growth_rate == leader.growth_rate => format!(
            "{} and {} grew at the same rate for {}: {} ({})",
            channel_name(leader.key),
            channel_name(other.key),
            filter.scope(),
            signed_pct(leader.growth_rate),
            windows.label()
        ),
        Some(other) => format!(
            "{} grew faster than {} for {}: {} vs {} ({})",
            channel_name(leader.key),
            channel_name(other.key),
            filter.scope(),
            signed_pct(leader.growth_rate),
            signed_pct(other.growth_rate),
            windows.label()
        ),
        None => format!(
            "Only {} has growth data for {}: {} ({})",
            channel_name(leader.key),
            filter.scope(),
            signed_pct(leader.growth_rate),
            windows.label()
        ),
    };

    let mut kpis = Kpis::new();
    for g in &ranked {
        kpis.insert(
            channel_name(g.key).to_string(),
            json!(signed_pct(g.growth_rate)),
        );
    }

    let table: Vec<Row> = ranked
        .iter()
        .map(|g| {
            let mut row = Row::new();
            row.insert("channel".into(), json!(g.key));
            row.insert("growth_rate".into(), json!(g.growth_rate));
            row.insert("revenue".into(), json!(round_to(g.revenue, 2)));
            row
        })
        .collect();

    let chart = ChartRequest::bar(
        "channel-growth",
        ranked.iter().map(|g| g.growth_rate).collect(),
    );

    let mut scope_filters = vec![format!(
        "Channel: All ({})",
        CHANNELS
            .iter()
            .map(|c| channel_name(c))
            .collect::<Vec<_>>()
            .join(", ")
    )];
    if filter.pack_types.is_empty() {
        scope_filters.push(format!(
            "Pack: All ({})",
            PACK_TYPES
                .iter()
                .map(|p| pack_name(p))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let sql = growth_sql(windows, "channel", &filter);

    PartialResult {
        intent: Intent::ChannelGrowthComparison,
        headline,
        kpis: Some(kpis),
        table: Some(table),
        chart: Some(chart),
        details: Some(query_details(
            SALES_FACTS_SOURCE,
            format!("{} (year over year)", windows.label()),
            &filter,
            scope_filters,
            sql,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_dataset;
    use crate::nlu::NluPipeline;

    fn run(q: &str) -> PartialResult {
        let question = NluPipeline::new().analyze(q);
        handle(&generate_dataset(None), &question)
    }

    #[test]
    fn ecommerce_outgrows_retail() {
        let result = run("In e-commerce vs retail, which channel grew faster for multipack yogurt?");
        assert!(result
            .headline
            .starts_with("E-commerce grew faster than Retail for multipack yogurt"));
        let kpis = result.kpis.unwrap();
        let keys: Vec<&str> = kpis.keys().map(String::as_str).collect();
        assert_eq!(keys, ["E-commerce", "Retail"]);
        let table = result.table.unwrap();
        assert_eq!(table.len(), 2);
        assert!(table[0]["growth_rate"].as_f64() >= table[1]["growth_rate"].as_f64());
    }

    #[test]
    fn channel_mentions_do_not_drop_a_channel() {
        let table = run("ecommerce single pack growth").table.unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn details_list_the_compared_scope() {
        let details = run("which channel grew faster").details.unwrap();
        assert_eq!(
            details.filters,
            vec![
                "Channel: All (Retail, E-commerce)",
                "Pack: All (Single, Multipack, Shelf-stable)"
            ]
        );
        let details = run("which channel grew faster for multipack in UK").details.unwrap();
        assert_eq!(
            details.filters,
            vec!["Pack: Multipack", "Channel: All (Retail, E-commerce)"]
        );
        assert_eq!(details.regions, vec!["UK"]);
    }
}
