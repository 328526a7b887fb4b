//! # Top Occasions Handler
//!
//! Revenue (or units, when asked) by consumption occasion over the latest 12
//! months, ranked descending with ties by occasion name. Pack, market and
//! channel mentions narrow the records; "top N" keeps the first N.

use std::collections::BTreeMap;

use serde_json::json;

use super::format::{capitalize, compact, money, pct, rank_label, round_to};
use super::{no_match, query_details, resolve_top_k, RecordFilter, RESEARCH_SOURCE};
use crate::chart::ChartRequest;
use crate::data::{Dataset, Metric};
use crate::nlu::{Intent, Question};
use crate::response::{Kpis, PartialResult, Row};
use crate::sql::{SqlSketch, CONSUMER_RESEARCH};

struct OccasionTotal {
    occasion: &'static str,
    value: f64,
    /// Percent of the total.
    share: f64,
}

pub fn handle(dataset: &Dataset, question: &Question) -> PartialResult {
    let params = &question.params;
    let filter = RecordFilter::from_params(params);
    let metric = match params.metric {
        Some(Metric::Units) => Metric::Units,
        _ => Metric::Revenue,
    };

    let Some(period) = dataset.latest_year() else {
        return no_match(Intent::TopOccasions, &filter, "the latest 12 months");
    };

    let mut totals: BTreeMap<&'static str, f64> = BTreeMap::new();
    for record in dataset.in_period(period).filter(|r| filter.matches(r)) {
        *totals.entry(record.occasion).or_default() += metric.value(record);
    }
    let grand_total: f64 = totals.values().sum();
    if totals.is_empty() || grand_total <= 0.0 {
        return no_match(Intent::TopOccasions, &filter, &period.label());
    }

    let mut ranked: Vec<OccasionTotal> = totals
        .into_iter()
        .map(|(occasion, value)| OccasionTotal {
            occasion,
            value,
            share: round_to(value / grand_total * 100.0, 1),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.occasion.cmp(b.occasion))
    });
    let k = resolve_top_k(params.top_k, ranked.len(), ranked.len());
    ranked.truncate(k);

    let show = |value: f64| match metric {
        Metric::Units => format!("{} units", compact(value)),
        _ => money(value),
    };
    let leader = &ranked[0];
    let headline = format!(
        "{} leads consumption occasions for {} with {} of {} ({})",
        capitalize(leader.occasion),
        filter.scope(),
        pct(leader.share),
        metric.label(),
        period.label()
    );

    let mut kpis = Kpis::new();
    kpis.insert(
        rank_label(1, "Occasion"),
        json!(format!("{} ({})", leader.occasion, pct(leader.share))),
    );
    kpis.insert(
        format!("Total {}", capitalize(metric.label())),
        json!(show(grand_total)),
    );

    let table: Vec<Row> = ranked
        .iter()
        .map(|o| {
            let mut row = Row::new();
            row.insert("occasion".into(), json!(o.occasion));
            row.insert(metric.column().into(), json!(round_to(o.value, 2)));
            row.insert("share".into(), json!(o.share));
            row
        })
        .collect();

    let chart = ChartRequest::bar("occasions", ranked.iter().map(|o| o.share).collect());

    let sql = filter
        .to_sql(
            SqlSketch::from(CONSUMER_RESEARCH)
                .select("occasion")
                .select(format!("SUM({0}) AS {0}", metric.column()))
                .select(format!(
                    "ROUND(SUM({0}) * 100.0 / SUM(SUM({0})) OVER (), 1) AS share",
                    metric.column()
                ))
                .during(period),
        )
        .group_by("occasion")
        .order_by(format!("{} DESC, occasion ASC", metric.column()))
        .limit(k);

    PartialResult {
        intent: Intent::TopOccasions,
        headline,
        kpis: Some(kpis),
        table: Some(table),
        chart: Some(chart),
        details: Some(query_details(
            RESEARCH_SOURCE,
            format!("Latest 12 months ({})", period.label()),
            &filter,
            Vec::new(),
            sql,
        )),
    }
}
