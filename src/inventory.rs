//! Inventory reconciliation.
//!
//! Per item per day: expected outflow = prior-day closing stock + today's
//! stock-in − today's closing stock, compared against the delivery
//! quantities actually recorded in the order tables for the same day.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::dates;
use crate::orders::{COL_DATE, COL_PRODUCT, COL_QUANTITY};
use crate::table::Table;

const COL_ITEM: &str = "Item";
const COL_CLOSING: &str = "Closing stock";

/// One item's reconciliation line for a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRow {
    pub item: String,
    pub prior_closing: f64,
    pub stock_in: f64,
    pub closing: f64,
    pub expected: f64,
    pub actual: f64,
    pub discrepancy: f64,
}

/// Closing-stock counts for one day, keyed by item. Multiple snapshot rows
/// for the same item keep the last entry (a re-count replaces the earlier
/// one).
pub fn closing_by_item(daily_close: &Table, date: NaiveDate) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for idx in 0..daily_close.rows.len() {
        if dates::parse_flexible(daily_close.cell(idx, COL_DATE)) != Some(date) {
            continue;
        }
        let item = daily_close.cell(idx, COL_ITEM).trim();
        if item.is_empty() {
            continue;
        }
        counts.insert(item.to_string(), daily_close.number(idx, COL_CLOSING));
    }
    counts
}

/// Stock-in quantities for one day, keyed by item and summed.
pub fn stock_in_by_item(stock_in: &Table, date: NaiveDate) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for idx in 0..stock_in.rows.len() {
        if dates::parse_flexible(stock_in.cell(idx, COL_DATE)) != Some(date) {
            continue;
        }
        let item = stock_in.cell(idx, COL_ITEM).trim();
        if item.is_empty() {
            continue;
        }
        *totals.entry(item.to_string()).or_insert(0.0) += stock_in.number(idx, COL_QUANTITY);
    }
    totals
}

/// Delivered quantities per product for one day, summed across order tables.
pub fn deliveries_by_item(order_tables: &[&Table], date: NaiveDate) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for table in order_tables {
        for idx in 0..table.rows.len() {
            if dates::parse_flexible(table.cell(idx, COL_DATE)) != Some(date) {
                continue;
            }
            let item = table.cell(idx, COL_PRODUCT).trim();
            if item.is_empty() {
                continue;
            }
            *totals.entry(item.to_string()).or_insert(0.0) += table.number(idx, COL_QUANTITY);
        }
    }
    totals
}

/// Reconcile one day. Items appearing in any input are reported; a missing
/// prior-day closing reads as zero stock.
pub fn reconcile(
    prior_closing: &BTreeMap<String, f64>,
    stock_in: &BTreeMap<String, f64>,
    closing: &BTreeMap<String, f64>,
    actual: &BTreeMap<String, f64>,
) -> Vec<ReconciliationRow> {
    let items: BTreeSet<&String> = prior_closing
        .keys()
        .chain(stock_in.keys())
        .chain(closing.keys())
        .chain(actual.keys())
        .collect();

    items
        .into_iter()
        .map(|item| {
            let prior = prior_closing.get(item).copied().unwrap_or(0.0);
            let inflow = stock_in.get(item).copied().unwrap_or(0.0);
            let close = closing.get(item).copied().unwrap_or(0.0);
            let delivered = actual.get(item).copied().unwrap_or(0.0);
            let expected = prior + inflow - close;
            ReconciliationRow {
                item: item.clone(),
                prior_closing: prior,
                stock_in: inflow,
                closing: close,
                expected,
                actual: delivered,
                discrepancy: expected - delivered,
            }
        })
        .collect()
}

/// Reconcile a day from the raw worksheets.
pub fn reconcile_day(
    daily_close: &Table,
    stock_in: &Table,
    order_tables: &[&Table],
    date: NaiveDate,
) -> Vec<ReconciliationRow> {
    let prior = closing_by_item(daily_close, date - Duration::days(1));
    let inflow = stock_in_by_item(stock_in, date);
    let close = closing_by_item(daily_close, date);
    let actual = deliveries_by_item(order_tables, date);
    reconcile(&prior, &inflow, &close, &actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_table(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new(&["Date", "Item", "Closing stock", "Note", "Recorded by"]);
        for (date, item, qty) in rows {
            table.push_row(vec![
                date.to_string(), item.to_string(), qty.to_string(), String::new(), String::new(),
            ]);
        }
        table
    }

    fn stock_in_table(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new(&["Date", "Item", "Quantity", "Note", "Recorded by"]);
        for (date, item, qty) in rows {
            table.push_row(vec![
                date.to_string(), item.to_string(), qty.to_string(), String::new(), String::new(),
            ]);
        }
        table
    }

    fn moto_deliveries(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new(&[
            "Date", "Customer", "Code", "Street", "Product", "Container", "Quantity",
            "Empties returned", "Paid", "Payment method", "Note", "Shipper",
        ]);
        for (date, product, qty) in rows {
            table.push_row(vec![
                date.to_string(), "C".into(), "".into(), "".into(), product.to_string(),
                "bottle".into(), qty.to_string(), "".into(), "0".into(), "cash".into(),
                "".into(), "Phap".into(),
            ]);
        }
        table
    }

    #[test]
    fn test_zero_discrepancy_when_actual_matches_expected() {
        // Prior 100, stock-in 20, closing 70 => expected 50; actual 50 => 0.
        let daily_close = close_table(&[
            ("04-01-2026", "Aqua 500", "100"),
            ("05-01-2026", "Aqua 500", "70"),
        ]);
        let stock_in = stock_in_table(&[("05-01-2026", "Aqua 500", "20")]);
        let orders = moto_deliveries(&[
            ("05-01-2026", "Aqua 500", "30"),
            ("05-01-2026", "Aqua 500", "20"),
        ]);

        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let rows = reconcile_day(&daily_close, &stock_in, &[&orders], date);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.expected, 50.0);
        assert_eq!(row.actual, 50.0);
        assert_eq!(row.discrepancy, 0.0);
    }

    #[test]
    fn test_discrepancy_surfaces_shortfall() {
        let daily_close = close_table(&[
            ("04-01-2026", "Aqua 500", "100"),
            ("05-01-2026", "Aqua 500", "60"),
        ]);
        let stock_in = stock_in_table(&[]);
        let orders = moto_deliveries(&[("05-01-2026", "Aqua 500", "30")]);

        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let rows = reconcile_day(&daily_close, &stock_in, &[&orders], date);

        // Expected 40 left the shelf, only 30 recorded as delivered.
        assert_eq!(rows[0].expected, 40.0);
        assert_eq!(rows[0].discrepancy, 10.0);
    }

    #[test]
    fn test_missing_prior_day_reads_as_zero() {
        let daily_close = close_table(&[("05-01-2026", "Ocany 350", "5")]);
        let stock_in = stock_in_table(&[("05-01-2026", "Ocany 350", "10")]);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let rows = reconcile_day(&daily_close, &stock_in, &[], date);
        assert_eq!(rows[0].prior_closing, 0.0);
        assert_eq!(rows[0].expected, 5.0);
        assert_eq!(rows[0].discrepancy, 5.0);
    }

    #[test]
    fn test_items_union_includes_delivery_only_items() {
        // An item with recorded deliveries but no stock records still shows.
        let daily_close = close_table(&[]);
        let stock_in = stock_in_table(&[]);
        let orders = moto_deliveries(&[("05-01-2026", "Aqua 5l", "3")]);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let rows = reconcile_day(&daily_close, &stock_in, &[&orders], date);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item, "Aqua 5l");
        assert_eq!(rows[0].actual, 3.0);
        assert_eq!(rows[0].discrepancy, -3.0);
    }

    #[test]
    fn test_recount_keeps_last_closing_entry() {
        let daily_close = close_table(&[
            ("05-01-2026", "Aqua 500", "70"),
            ("05-01-2026", "Aqua 500", "72"),
        ]);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let counts = closing_by_item(&daily_close, date);
        assert_eq!(counts.get("Aqua 500"), Some(&72.0));
    }
}
