//! # Trend Handler
//!
//! Monthly revenue and units for a window of months.
//!
//! | Question says | Window |
//! |---------------|--------|
//! | one year, e.g. "in 2023" | that calendar year |
//! | "last N months", 1 ≤ N ≤ 24 | trailing N months |
//! | anything else | trailing 12 months |
//!
//! Market, channel and pack mentions narrow the records. The table holds one
//! row per month in ascending order and the chart is a revenue line.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::json;

use super::format::{capitalize, month_key, month_label, money, round_to, signed_pct};
use super::{no_match, query_details, RecordFilter, SALES_FACTS_SOURCE};
use crate::chart::ChartRequest;
use crate::data::{Dataset, Period};
use crate::nlu::{Intent, Question};
use crate::response::{Kpis, PartialResult, Row};
use crate::sql::{SqlSketch, SALES_FACTS};

/// Window used when the question names none.
pub const DEFAULT_MONTHS: usize = 12;
/// Longest accepted trailing window.
pub const MAX_MONTHS: usize = 24;

/// Trailing window for a requested month count.
pub fn window_months(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if (1..=MAX_MONTHS).contains(&n) => n,
        _ => DEFAULT_MONTHS,
    }
}

#[derive(Clone, Copy, Default)]
struct MonthTotals {
    revenue: f64,
    units: f64,
}

pub fn handle(dataset: &Dataset, question: &Question) -> PartialResult {
    let params = &question.params;
    let filter = RecordFilter::from_params(params);

    let (period, time_range) = match params.year {
        Some(year) => match dataset.year(year) {
            Some(period) => (period, period.label()),
            None => return no_match(Intent::Trend, &filter, &year.to_string()),
        },
        None => {
            let months = window_months(params.trailing_months);
            match dataset.trailing(months) {
                Some(period) => (period, format!("Last {months} months ({})", period.label())),
                None => return no_match(Intent::Trend, &filter, "the requested months"),
            }
        }
    };

    let mut by_month: BTreeMap<NaiveDate, MonthTotals> = BTreeMap::new();
    for record in dataset.in_period(period).filter(|r| filter.matches(r)) {
        let totals = by_month.entry(record.month).or_default();
        totals.revenue += record.revenue;
        totals.units += record.units;
    }

    let (Some((&first_month, &first)), Some((&last_month, &last))) =
        (by_month.first_key_value(), by_month.last_key_value())
    else {
        return no_match(Intent::Trend, &filter, &period.label());
    };

    let change = if first.revenue > 0.0 {
        (last.revenue - first.revenue) / first.revenue * 100.0
    } else {
        0.0
    };
    let verb = match round_to(change, 1) {
        c if c > 0.0 => "rose",
        c if c < 0.0 => "fell",
        _ => "held steady",
    };
    let total_revenue: f64 = by_month.values().map(|t| t.revenue).sum();

    let headline = format!(
        "{} revenue {verb} {} from {} to {} ({} → {})",
        capitalize(&filter.scope()),
        signed_pct(change),
        month_label(first_month),
        month_label(last_month),
        money(first.revenue),
        money(last.revenue),
    );

    let mut kpis = Kpis::new();
    kpis.insert(
        format!("Start ({})", month_label(first_month)),
        json!(money(first.revenue)),
    );
    kpis.insert(
        format!("End ({})", month_label(last_month)),
        json!(money(last.revenue)),
    );
    kpis.insert("Change".into(), json!(signed_pct(change)));
    kpis.insert("Total Revenue".into(), json!(money(total_revenue)));

    let table: Vec<Row> = by_month
        .iter()
        .map(|(&month, totals)| {
            let mut row = Row::new();
            row.insert("month".into(), json!(month_key(month)));
            row.insert("revenue".into(), json!(round_to(totals.revenue, 2)));
            row.insert("units".into(), json!(round_to(totals.units, 0)));
            row
        })
        .collect();

    let chart = ChartRequest::line("trend", by_month.values().map(|t| t.revenue).collect());

    PartialResult {
        intent: Intent::Trend,
        headline,
        kpis: Some(kpis),
        table: Some(table),
        chart: Some(chart),
        details: Some(query_details(
            SALES_FACTS_SOURCE,
            time_range,
            &filter,
            Vec::new(),
            sql(period, &filter),
        )),
    }
}

fn sql(period: Period, filter: &RecordFilter) -> SqlSketch {
    filter
        .to_sql(
            SqlSketch::from(SALES_FACTS)
                .select("month")
                .select("SUM(revenue) AS revenue")
                .select("SUM(units) AS units")
                .during(period),
        )
        .group_by("month")
        .order_by("month ASC")
}
