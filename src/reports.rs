//! Revenue reports: group order revenue by day, ISO week, or month.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dates;
use crate::orders::{self, OrderSource, COL_DATE};
use crate::table::Table;

/// Grouping bucket for revenue reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    /// ISO week starting Monday; buckets are labelled by the Monday's date.
    Week,
    /// Calendar month; buckets are labelled by the month's first day.
    Month,
}

impl Granularity {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(format!("Unknown granularity: {other}")),
        }
    }

    /// First day of the bucket containing `date`.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => dates::week_monday(date),
            Self::Month => dates::month_first(date),
        }
    }
}

/// Sum revenue per bucket over the given order tables, restricted to an
/// inclusive date range. Rows with unparseable dates are skipped. Buckets
/// come back sorted ascending.
pub fn revenue_buckets(
    sources: &[(OrderSource, Table)],
    granularity: Granularity,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<(NaiveDate, f64)> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (source, table) in sources {
        for idx in 0..table.rows.len() {
            let Some(date) = dates::parse_flexible(table.cell(idx, COL_DATE)) else {
                continue;
            };
            if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
                continue;
            }
            let revenue = orders::row_revenue(*source, table, idx);
            *buckets.entry(granularity.bucket_start(date)).or_insert(0.0) += revenue;
        }
    }
    buckets.into_iter().collect()
}
