//! # Data Module: Synthetic Sales Facts
//!
//! Everything the handlers compute is derived from one in-memory table of
//! yogurt sales, generated at start-up.
//!
//! | Item | Responsibility |
//! |------|----------------|
//! | [`SalesRecord`] | One immutable fact row |
//! | [`Metric`] | Revenue, units or repeat rate, with its aggregation rule |
//! | [`Dataset`] | Ordered, read-only record collection plus month periods |
//! | [`generate_dataset`] | Seeded generator |

pub mod dataset;
pub mod generator;
pub mod record;

pub use dataset::{Dataset, Period};
pub use generator::{generate_dataset, DEFAULT_SEED};
pub use record::{Metric, SalesRecord, AGE_SEGMENTS, CHANNELS, MARKETS, OCCASIONS, PACK_TYPES};

/// Hand-built datasets for handler tests.
#[cfg(test)]
pub(crate) mod testing {
    use chrono::NaiveDate;

    use super::{Dataset, SalesRecord};

    /// `count` consecutive months starting January 2023.
    pub(crate) fn months(count: usize) -> Vec<NaiveDate> {
        (0..count as u32)
            .map(|i| NaiveDate::from_ymd_opt(2023 + (i / 12) as i32, i % 12 + 1, 1).unwrap())
            .collect()
    }

    /// A retail, single-pack, 18-34 fact.
    pub(crate) fn fact(
        month: NaiveDate,
        market: &'static str,
        occasion: &'static str,
        revenue: f64,
    ) -> SalesRecord {
        SalesRecord {
            month,
            market,
            age_segment: "18-34",
            channel: "retail",
            occasion,
            pack_type: "single",
            revenue,
            units: revenue / 2.0,
            repeat_rate: 0.4,
        }
    }

    pub(crate) fn dataset(records: Vec<SalesRecord>, months: Vec<NaiveDate>) -> Dataset {
        Dataset::new(records, months, 0)
    }
}
