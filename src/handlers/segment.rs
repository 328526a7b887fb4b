//! # Segment Comparison Handler
//!
//! Compares two age segments on one metric over the latest 12 months.
//!
//! - Segments: the first two recognized in the question, otherwise the
//!   configured pair in configured order.
//! - Metric: repeat rate (mean) unless the question asks for revenue or
//!   units (sum).
//! - KPIs are keyed exactly by the two segment labels.

use serde_json::{json, Value};

use super::format::{compact, money, rate, round_to};
use super::{no_match, query_details, RecordFilter, SEGMENT_SOURCE};
use crate::data::{Dataset, Metric, AGE_SEGMENTS};
use crate::nlu::{Intent, Question};
use crate::response::{Kpis, PartialResult, Row};
use crate::sql::{SqlSketch, SEGMENT_ANALYTICS};

/// The two segments to compare.
pub fn segment_pair(requested: &[&'static str]) -> [&'static str; 2] {
    match requested {
        &[a, b, ..] => [a, b],
        _ => [AGE_SEGMENTS[0], AGE_SEGMENTS[1]],
    }
}

/// Metric value for display.
pub fn display_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::RepeatRate => rate(value),
        Metric::Revenue => money(value),
        Metric::Units => format!("{} units", compact(value)),
    }
}

fn json_value(metric: Metric, value: f64) -> Value {
    match metric {
        Metric::RepeatRate => json!(round_to(value, 4)),
        Metric::Revenue => json!(round_to(value, 2)),
        Metric::Units => json!(round_to(value, 0)),
    }
}

pub fn handle(dataset: &Dataset, question: &Question) -> PartialResult {
    let params = &question.params;
    let filter = RecordFilter::from_params(params);
    let [first, second] = segment_pair(&params.age_segments);
    let metric = params.metric.unwrap_or(Metric::RepeatRate);

    let Some(period) = dataset.latest_year() else {
        return no_match(Intent::SegmentComparison, &filter, "the latest 12 months");
    };

    let value_of = |segment: &str| {
        metric.aggregate(
            dataset
                .in_period(period)
                .filter(|r| r.age_segment == segment && filter.matches(r)),
        )
    };
    let (Some(a), Some(b)) = (value_of(first), value_of(second)) else {
        return no_match(Intent::SegmentComparison, &filter, &period.label());
    };

    let shown_a = display_value(metric, a);
    let shown_b = display_value(metric, b);
    let headline = if shown_a == shown_b {
        format!(
            "{first} and {second} are level on {} for {}: {shown_a} each ({})",
            metric.label(),
            filter.scope(),
            period.label()
        )
    } else {
        let ((hi, hi_shown), (lo, lo_shown)) = if a > b {
            ((first, &shown_a), (second, &shown_b))
        } else {
            ((second, &shown_b), (first, &shown_a))
        };
        format!(
            "{hi} has the higher {} for {}: {hi_shown} vs {lo_shown} for {lo} ({})",
            metric.label(),
            filter.scope(),
            period.label()
        )
    };

    let mut kpis = Kpis::new();
    kpis.insert(first.to_string(), json_value(metric, a));
    kpis.insert(second.to_string(), json_value(metric, b));

    let table: Vec<Row> = [(first, a), (second, b)]
        .into_iter()
        .map(|(segment, value)| {
            let mut row = Row::new();
            row.insert("age_segment".into(), json!(segment));
            row.insert(metric.column().into(), json_value(metric, value));
            row
        })
        .collect();

    let aggregate = match metric {
        Metric::RepeatRate => "AVG",
        Metric::Revenue | Metric::Units => "SUM",
    };
    let sql = filter
        .to_sql(
            SqlSketch::from(SEGMENT_ANALYTICS)
                .select("age_segment")
                .select(format!("{aggregate}({0}) AS {0}", metric.column()))
                .during(period)
                .filter_in("age_segment", &[first, second]),
        )
        .group_by("age_segment");

    PartialResult {
        intent: Intent::SegmentComparison,
        headline,
        kpis: Some(kpis),
        table: Some(table),
        chart: None,
        details: Some(query_details(
            SEGMENT_SOURCE,
            format!("Latest 12 months ({})", period.label()),
            &filter,
            vec![format!("Age: {first}"), format!("Age: {second}")],
            sql,
        )),
    }
}
