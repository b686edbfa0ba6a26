//! Delivery order records.
//!
//! Two row shapes share one revenue rule: a car order is worth
//! quantity × unit price when that product is positive, otherwise whatever
//! was actually collected; a motorbike order is always worth the collected
//! amount (motorbike rows carry no unit price).

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::dates;
use crate::table::Table;
use crate::tables::{self, WorksheetSpec};

pub const COL_DATE: &str = "Date";
pub const COL_PRODUCT: &str = "Product";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_UNIT_PRICE: &str = "Unit price";
pub const COL_PAID: &str = "Paid";
pub const COL_SHIPPER: &str = "Shipper";
pub const COL_SHIPPER_1: &str = "Shipper 1";
pub const COL_SHIPPER_2: &str = "Shipper 2";

/// Which order table a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSource {
    Motorbike,
    Car,
}

impl OrderSource {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "motorbike" | "motorbike_orders" => Ok(Self::Motorbike),
            "car" | "car_orders" => Ok(Self::Car),
            other => Err(format!("Unknown order source: {other}")),
        }
    }

    pub fn spec(self) -> WorksheetSpec {
        match self {
            Self::Motorbike => tables::MOTORBIKE_ORDERS,
            Self::Car => tables::CAR_ORDERS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Motorbike => "motorbike",
            Self::Car => "car",
        }
    }
}

/// Revenue of a car order row. Falls back to the paid amount when quantity
/// or price is missing/zero.
pub fn car_revenue(quantity: f64, unit_price: f64, paid: f64) -> f64 {
    let gross = quantity * unit_price;
    if gross > 0.0 {
        gross
    } else {
        paid
    }
}

/// Revenue of one row of an order table.
pub fn row_revenue(source: OrderSource, table: &Table, idx: usize) -> f64 {
    match source {
        OrderSource::Car => car_revenue(
            table.number(idx, COL_QUANTITY),
            table.number(idx, COL_UNIT_PRICE),
            table.number(idx, COL_PAID),
        ),
        OrderSource::Motorbike => table.number(idx, COL_PAID),
    }
}

/// Non-blank shippers credited with a row, with the share of its revenue and
/// quantity each receives (car rows split evenly across their shippers).
pub fn row_shipper_shares(source: OrderSource, table: &Table, idx: usize) -> Vec<(String, f64)> {
    let shippers: Vec<String> = match source {
        OrderSource::Motorbike => vec![table.cell(idx, COL_SHIPPER).trim().to_string()],
        OrderSource::Car => vec![
            table.cell(idx, COL_SHIPPER_1).trim().to_string(),
            table.cell(idx, COL_SHIPPER_2).trim().to_string(),
        ],
    };
    let shippers: Vec<String> = shippers.into_iter().filter(|s| !s.is_empty()).collect();
    if shippers.is_empty() {
        return Vec::new();
    }
    let share = 1.0 / shippers.len() as f64;
    shippers.into_iter().map(|s| (s, share)).collect()
}

/// Keep rows whose date parses and falls inside the inclusive range, with
/// the date cell rewritten in canonical form. Unparseable dates are dropped.
pub fn filter_by_range(
    table: &Table,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Table {
    let header_refs: Vec<&str> = table.headers.iter().map(|h| h.as_str()).collect();
    let mut filtered = Table::new(&header_refs);
    let date_idx = table.col(COL_DATE);

    for idx in 0..table.rows.len() {
        let Some(date) = dates::parse_flexible(table.cell(idx, COL_DATE)) else {
            continue;
        };
        if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
            continue;
        }
        let mut row = table.rows[idx].clone();
        if let Some(di) = date_idx {
            row[di] = dates::format_date(date);
        }
        filtered.push_row(row);
    }
    filtered
}

/// Summary totals shown under the order list.
pub fn summary(source: OrderSource, table: &Table) -> Value {
    let mut quantity = 0.0;
    let mut paid = 0.0;
    let mut revenue = 0.0;
    for idx in 0..table.rows.len() {
        quantity += table.number(idx, COL_QUANTITY);
        paid += table.number(idx, COL_PAID);
        revenue += row_revenue(source, table, idx);
    }
    match source {
        OrderSource::Motorbike => json!({
            "quantity": quantity,
            "paid": paid,
        }),
        OrderSource::Car => json!({
            "quantity": quantity,
            "revenue": revenue,
            "paid": paid,
        }),
    }
}
