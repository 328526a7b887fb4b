//! # Dataset: the In-Memory Fact Table
//!
//! [`Dataset`] owns every [`SalesRecord`] of the span and is read-only once
//! built. Handlers borrow it and never mutate it, so a single instance can be
//! shared by concurrent requests without locking.
//!
//! ## Periods
//!
//! Growth figures compare the **latest 12 months** of the span with the
//! **prior 12 months**. [`Period`] is the inclusive month range used for
//! those windows and for trailing-N-months filters.

use chrono::{Datelike, NaiveDate};

use super::record::SalesRecord;

/// Inclusive range of months.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// `true` if `month` falls inside the range.
    pub fn contains(&self, month: NaiveDate) -> bool {
        self.start <= month && month <= self.end
    }

    /// Label for headlines: `"2024"` for a calendar year,
    /// `"Mar 2024 to Dec 2024"` otherwise.
    pub fn label(&self) -> String {
        if self.start.year() == self.end.year() && self.start.month() == 1 && self.end.month() == 12
        {
            self.start.year().to_string()
        } else if self.start == self.end {
            self.start.format("%b %Y").to_string()
        } else {
            format!(
                "{} to {}",
                self.start.format("%b %Y"),
                self.end.format("%b %Y")
            )
        }
    }
}

/// Ordered, immutable collection of sales records.
///
/// Invariant: every (month, market, age segment, channel, occasion)
/// combination of the span appears exactly once.
#[derive(Clone, Debug)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    months: Vec<NaiveDate>,
    seed: u64,
}

impl Dataset {
    pub(crate) fn new(records: Vec<SalesRecord>, months: Vec<NaiveDate>, seed: u64) -> Self {
        Self {
            records,
            months,
            seed,
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Months of the span, ascending.
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    /// Seed the dataset was generated with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `n` months of the span (clamped to the span length).
    ///
    /// Returns `None` for an empty span or `n == 0`.
    pub fn trailing(&self, n: usize) -> Option<Period> {
        if n == 0 || self.months.is_empty() {
            return None;
        }
        let n = n.min(self.months.len());
        let end = *self.months.last()?;
        let start = self.months[self.months.len() - n];
        Some(Period { start, end })
    }

    /// Calendar year `year`, if the span covers any month of it.
    pub fn year(&self, year: i32) -> Option<Period> {
        let mut months = self.months.iter().filter(|m| m.year() == year);
        let start = *months.next()?;
        let end = months.last().copied().unwrap_or(start);
        Some(Period { start, end })
    }

    /// Latest 12 months of the span.
    pub fn latest_year(&self) -> Option<Period> {
        self.trailing(12)
    }

    /// The 12 months before [`latest_year`](Dataset::latest_year).
    ///
    /// `None` when the span is shorter than 24 months.
    pub fn prior_year(&self) -> Option<Period> {
        let len = self.months.len();
        if len < 24 {
            return None;
        }
        Some(Period {
            start: self.months[len - 24],
            end: self.months[len - 13],
        })
    }

    /// Records inside `period`.
    pub fn in_period(&self, period: Period) -> impl Iterator<Item = &SalesRecord> {
        self.records.iter().filter(move |r| period.contains(r.month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn span() -> Dataset {
        let months = (0..24)
            .map(|i| ym(2023 + i / 12, (i % 12 + 1) as u32))
            .collect();
        Dataset::new(Vec::new(), months, 1)
    }

    #[test]
    fn trailing_window_ends_at_last_month() {
        let period = span().trailing(3).unwrap();
        assert_eq!(period.start, ym(2024, 10));
        assert_eq!(period.end, ym(2024, 12));
        assert_eq!(period.label(), "Oct 2024 to Dec 2024");
    }

    #[test]
    fn trailing_window_is_clamped_to_span() {
        let period = span().trailing(100).unwrap();
        assert_eq!(period.start, ym(2023, 1));
        assert!(span().trailing(0).is_none());
    }

    #[test]
    fn latest_and_prior_years_are_adjacent() {
        let ds = span();
        let latest = ds.latest_year().unwrap();
        let prior = ds.prior_year().unwrap();
        assert_eq!(latest.label(), "2024");
        assert_eq!(prior.label(), "2023");
        assert!(!prior.contains(latest.start));
    }

    #[test]
    fn year_outside_span_is_none() {
        assert!(span().year(2022).is_none());
        assert_eq!(span().year(2023).unwrap().end, ym(2023, 12));
    }
}
