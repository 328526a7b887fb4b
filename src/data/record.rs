//! # Sales Record and Dataset Dimensions
//!
//! A [`SalesRecord`] is one cell of the synthetic fact table: the sales of a
//! single (month, market, age segment, channel, occasion) combination.
//!
//! ## Fixed Dimensions
//!
//! | Dimension | Values |
//! |-----------|--------|
//! | market | US, UK, DE, IN, BR |
//! | age segment | 18-34, 35-54 |
//! | channel | retail, ecommerce |
//! | occasion | breakfast, snack, post-workout, late-night |
//! | pack type | single, multipack, shelf-stable |
//!
//! The pack type is an attribute of the record, not part of its key.

use chrono::NaiveDate;

/// Markets covered by the dataset, in generation order.
pub const MARKETS: &[&str] = &["US", "UK", "DE", "IN", "BR"];

/// Age segments. Exactly two, compared by the segment handler.
pub const AGE_SEGMENTS: &[&str] = &["18-34", "35-54"];

/// Sales channels.
pub const CHANNELS: &[&str] = &["retail", "ecommerce"];

/// Consumption occasions.
pub const OCCASIONS: &[&str] = &["breakfast", "snack", "post-workout", "late-night"];

/// Packaging variants usable as a filter.
pub const PACK_TYPES: &[&str] = &["single", "multipack", "shelf-stable"];

/// One immutable row of the synthetic fact table.
#[derive(Clone, Debug, PartialEq)]
pub struct SalesRecord {
    /// First day of the month the sales belong to.
    pub month: NaiveDate,
    pub market: &'static str,
    pub age_segment: &'static str,
    pub channel: &'static str,
    pub occasion: &'static str,
    pub pack_type: &'static str,
    /// Revenue in USD.
    pub revenue: f64,
    pub units: f64,
    /// Share of buyers purchasing again, in `[0, 1]`.
    pub repeat_rate: f64,
}

/// Numeric measure a handler can aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Revenue,
    Units,
    RepeatRate,
}

impl Metric {
    /// Column name used in tables.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Units => "units",
            Metric::RepeatRate => "repeat_rate",
        }
    }

    /// Human-readable name used in headlines.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Units => "units sold",
            Metric::RepeatRate => "repeat rate",
        }
    }

    /// Reads this metric from a record.
    pub fn value(&self, record: &SalesRecord) -> f64 {
        match self {
            Metric::Revenue => record.revenue,
            Metric::Units => record.units,
            Metric::RepeatRate => record.repeat_rate,
        }
    }

    /// Aggregates the metric over a set of records.
    ///
    /// Volumes (revenue, units) are summed; the repeat rate is a rate, so it
    /// is averaged. An empty set yields `None`.
    pub fn aggregate<'a, I>(&self, records: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a SalesRecord>,
    {
        let (total, count) = records
            .into_iter()
            .fold((0.0, 0usize), |(sum, n), r| (sum + self.value(r), n + 1));
        match (self, count) {
            (_, 0) => None,
            (Metric::RepeatRate, n) => Some(total / n as f64),
            _ => Some(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(revenue: f64, repeat_rate: f64) -> SalesRecord {
        SalesRecord {
            month: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            market: "US",
            age_segment: "18-34",
            channel: "retail",
            occasion: "breakfast",
            pack_type: "single",
            revenue,
            units: revenue / 2.0,
            repeat_rate,
        }
    }

    #[test]
    fn volumes_are_summed() {
        let records = [record(10.0, 0.2), record(30.0, 0.4)];
        assert_eq!(Metric::Revenue.aggregate(&records), Some(40.0));
        assert_eq!(Metric::Units.aggregate(&records), Some(20.0));
    }

    #[test]
    fn repeat_rate_is_averaged() {
        let records = [record(10.0, 0.2), record(30.0, 0.4)];
        let mean = Metric::RepeatRate.aggregate(&records).unwrap();
        assert!((mean - 0.3).abs() < 1e-12);
    }

    #[test]
    fn empty_set_has_no_aggregate() {
        assert_eq!(Metric::Revenue.aggregate(&[]), None);
        assert_eq!(Metric::RepeatRate.aggregate(&[]), None);
    }
}
