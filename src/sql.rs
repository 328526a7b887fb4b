//! # SQL Sketch
//!
//! Every answer carries a SQL rendering of the aggregation it performed, so
//! an analyst can reproduce the number against a warehouse. Nothing executes
//! it; it is a description, built with [`SqlSketch`] and rendered through
//! [`Display`](std::fmt::Display).
//!
//! ```text
//! SELECT market,
//!        SUM(revenue) AS revenue
//! FROM sales_facts
//! WHERE month BETWEEN '2024-01-01' AND '2024-12-01'
//!   AND channel = 'ecommerce'
//! GROUP BY market
//! ORDER BY revenue DESC
//! ```
//!
//! Clause order is fixed, so the same answer always yields the same text.

use std::fmt;

use crate::data::Period;

/// Table holding monthly sales facts.
pub const SALES_FACTS: &str = "sales_facts";
/// Table holding segment-level repeat analytics.
pub const SEGMENT_ANALYTICS: &str = "segment_analytics";
/// Table holding occasion research.
pub const CONSUMER_RESEARCH: &str = "consumer_research";

/// Builder for a single-table aggregate query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SqlSketch {
    select: Vec<String>,
    from: &'static str,
    filters: Vec<String>,
    group_by: Vec<String>,
    order_by: Option<String>,
    limit: Option<usize>,
}

impl SqlSketch {
    pub fn from(table: &'static str) -> Self {
        Self {
            from: table,
            ..Self::default()
        }
    }

    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.select.push(column.into());
        self
    }

    /// Restricts `month` to `period`.
    pub fn during(self, period: Period) -> Self {
        self.filter(format!(
            "month BETWEEN '{}' AND '{}'",
            period.start.format("%Y-%m-%d"),
            period.end.format("%Y-%m-%d")
        ))
    }

    /// `column = 'v'` for one value, `column IN (...)` for several. No-op
    /// when `values` is empty.
    pub fn filter_in(self, column: &str, values: &[&str]) -> Self {
        match values {
            [] => self,
            [value] => self.filter(format!("{column} = '{value}'")),
            _ => {
                let list = values
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.filter(format!("{column} IN ({list})"))
            }
        }
    }

    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.filters.push(predicate.into());
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

impl fmt::Display for SqlSketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.select.is_empty() {
            write!(f, "SELECT *")?;
        } else {
            write!(f, "SELECT {}", self.select.join(",\n       "))?;
        }
        write!(f, "\nFROM {}", self.from)?;
        if !self.filters.is_empty() {
            write!(f, "\nWHERE {}", self.filters.join("\n  AND "))?;
        }
        if !self.group_by.is_empty() {
            write!(f, "\nGROUP BY {}", self.group_by.join(", "))?;
        }
        if let Some(order) = &self.order_by {
            write!(f, "\nORDER BY {order}")?;
        }
        if let Some(n) = self.limit {
            write!(f, "\nLIMIT {n}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn full_query_layout() {
        let period = Period {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        };
        let sql = SqlSketch::from(SALES_FACTS)
            .select("market")
            .select("SUM(revenue) AS revenue")
            .during(period)
            .filter_in("channel", &["ecommerce"])
            .filter_in("market", &["US", "BR"])
            .group_by("market")
            .order_by("revenue DESC")
            .limit(3)
            .to_string();
        assert_eq!(
            sql,
            "SELECT market,\n       SUM(revenue) AS revenue\n\
             FROM sales_facts\n\
             WHERE month BETWEEN '2024-01-01' AND '2024-12-01'\n  \
             AND channel = 'ecommerce'\n  \
             AND market IN ('US', 'BR')\n\
             GROUP BY market\n\
             ORDER BY revenue DESC\n\
             LIMIT 3"
        );
    }

    #[test]
    fn empty_filter_list_adds_nothing() {
        let sql = SqlSketch::from(CONSUMER_RESEARCH)
            .filter_in("pack_type", &[])
            .to_string();
        assert_eq!(sql, "SELECT *\nFROM consumer_research");
    }
}
