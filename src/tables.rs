//! Worksheet operations: the sheet access layer.
//!
//! Every data table is a named tab in the remote spreadsheet, read and
//! written wholesale. Operations here sit over the REST client in `sheets`
//! and degrade the way the rest of the app expects: a missing worksheet
//! reads as an empty table, and writes create the tab (with its header row)
//! on first use.

use crate::dates;
use crate::sheets::{SheetError, SheetsClient};
use crate::table::Table;

/// Static schema of one worksheet: tab title plus header row.
#[derive(Debug, Clone, Copy)]
pub struct WorksheetSpec {
    pub title: &'static str,
    pub headers: &'static [&'static str],
}

pub const MOTORBIKE_ORDERS: WorksheetSpec = WorksheetSpec {
    title: "MOTORBIKE_ORDERS",
    headers: &[
        "Date",
        "Customer",
        "Code",
        "Street",
        "Product",
        "Container",
        "Quantity",
        "Empties returned",
        "Paid",
        "Payment method",
        "Note",
        "Shipper",
    ],
};

pub const CAR_ORDERS: WorksheetSpec = WorksheetSpec {
    title: "CAR_ORDERS",
    headers: &[
        "Date",
        "Customer",
        "Product",
        "Container",
        "Quantity",
        "Unit price",
        "Paid",
        "Payment method",
        "Note",
        "Shipper 1",
        "Shipper 2",
    ],
};

pub const DAILY_CLOSE: WorksheetSpec = WorksheetSpec {
    title: "DAILY_CLOSE",
    headers: &["Date", "Item", "Closing stock", "Note", "Recorded by"],
};

pub const STOCK_IN: WorksheetSpec = WorksheetSpec {
    title: "STOCK_IN",
    headers: &["Date", "Item", "Quantity", "Note", "Recorded by"],
};

pub const ATTENDANCE: WorksheetSpec = WorksheetSpec {
    title: "ATTENDANCE",
    headers: &["Date", "Employee", "Shift", "Credit", "Note"],
};

pub const LOOKUPS: WorksheetSpec = WorksheetSpec {
    title: "LOOKUPS",
    headers: &["Category", "Value"],
};

pub const INVENTORY: WorksheetSpec = WorksheetSpec {
    title: "INVENTORY",
    headers: &["Item", "Opening", "Stock in", "Stock out", "Closing", "Note"],
};

pub const PAY_RULES: WorksheetSpec = WorksheetSpec {
    title: "PAY_RULES",
    headers: &[
        "Employee",
        "Fixed salary",
        "Daily rate",
        "Allowance",
        "Advance",
        "Deduction",
    ],
};

pub const COMMISSION_RULES: WorksheetSpec = WorksheetSpec {
    title: "COMMISSION_RULES",
    headers: &["Product", "Per unit", "Percent"],
};

pub const PAYROLL: WorksheetSpec = WorksheetSpec {
    title: "PAYROLL",
    headers: &[
        "Month",
        "Employee",
        "Days",
        "Revenue",
        "Base pay",
        "Commission",
        "Allowance",
        "Advance",
        "Deduction",
        "Total pay",
    ],
};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Read a whole worksheet. A missing tab reads as an empty table carrying
/// the schema's headers so downstream column lookups still resolve.
pub async fn read_table(client: &SheetsClient, spec: WorksheetSpec) -> Result<Table, SheetError> {
    match client.get_values(spec.title).await {
        Ok(values) if values.is_empty() => Ok(Table::new(spec.headers)),
        Ok(values) => Ok(Table::from_values(values)),
        Err(SheetError::MissingWorksheet(_)) => Ok(Table::new(spec.headers)),
        Err(e) => Err(e),
    }
}

/// Create the worksheet tab with its header row if it does not exist yet.
pub async fn ensure_worksheet(client: &SheetsClient, spec: WorksheetSpec) -> Result<(), SheetError> {
    let titles = client.worksheet_titles().await?;
    if titles.iter().any(|t| t == spec.title) {
        return Ok(());
    }
    client.add_worksheet(spec.title).await?;
    let header: Vec<String> = spec.headers.iter().map(|h| h.to_string()).collect();
    client.append_values(spec.title, vec![header]).await
}

/// Append a single row, creating the worksheet on first use.
pub async fn append_row(
    client: &SheetsClient,
    spec: WorksheetSpec,
    row: Vec<String>,
) -> Result<(), SheetError> {
    ensure_worksheet(client, spec).await?;
    client.append_values(spec.title, vec![row]).await
}

/// Replace a worksheet's contents wholesale (header + rows).
pub async fn overwrite_table(
    client: &SheetsClient,
    spec: WorksheetSpec,
    table: &Table,
) -> Result<(), SheetError> {
    ensure_worksheet(client, spec).await?;
    client.clear_values(spec.title).await?;
    client.update_values(spec.title, table.to_values()).await
}

/// Replace all rows whose date column matches `date` with `new_rows`, leaving
/// every other date untouched.
pub async fn upsert_by_date(
    client: &SheetsClient,
    spec: WorksheetSpec,
    date_col: &str,
    date: chrono::NaiveDate,
    new_rows: &Table,
) -> Result<(), SheetError> {
    let old = read_table(client, spec).await?;
    let merged = merge_upsert(&old, date_col, date, new_rows);
    overwrite_table(client, spec, &merged).await
}

/// Rows of a date-keyed worksheet matching one calendar day, with the date
/// cell rewritten in canonical form.
pub fn rows_for_date(table: &Table, date_col: &str, date: chrono::NaiveDate) -> Table {
    let header_refs: Vec<&str> = table.headers.iter().map(|h| h.as_str()).collect();
    let mut filtered = Table::new(&header_refs);
    let date_idx = table.col(date_col);

    for idx in 0..table.rows.len() {
        if dates::parse_flexible(table.cell(idx, date_col)) != Some(date) {
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

/// Pure merge step of the upsert: keep old rows whose date differs from
/// `date` (comparison is on the parsed date, so mixed on-sheet formats still
/// match), then append the new rows. Column order follows the incoming rows;
/// any extra columns present only in the old table are retained after them.
pub fn merge_upsert(old: &Table, date_col: &str, date: chrono::NaiveDate, new_rows: &Table) -> Table {
    let mut headers: Vec<String> = new_rows.headers.clone();
    for h in &old.headers {
        if !headers.contains(h) {
            headers.push(h.clone());
        }
    }

    let header_refs: Vec<&str> = headers.iter().map(|h| h.as_str()).collect();
    let mut merged = Table::new(&header_refs);

    for idx in 0..old.rows.len() {
        let row_date = dates::parse_flexible(old.cell(idx, date_col));
        if row_date == Some(date) {
            continue;
        }
        let row: Vec<String> = headers
            .iter()
            .map(|h| old.cell(idx, h).to_string())
            .collect();
        merged.push_row(row);
    }

    for idx in 0..new_rows.rows.len() {
        let row: Vec<String> = headers
            .iter()
            .map(|h| new_rows.cell(idx, h).to_string())
            .collect();
        merged.push_row(row);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn close_table(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new(&["Date", "Item", "Closing stock"]);
        for (date, item, qty) in rows {
            table.push_row(vec![date.to_string(), item.to_string(), qty.to_string()]);
        }
        table
    }

    #[test]
    fn test_merge_upsert_replaces_only_matching_date() {
        let old = close_table(&[
            ("04-01-2026", "Aqua 500", "80"),
            ("05-01-2026", "Aqua 500", "70"),
            ("05-01-2026", "Ocany 350", "40"),
            ("06-01-2026", "Aqua 500", "65"),
        ]);
        let new_rows = close_table(&[
            ("05-01-2026", "Aqua 500", "72"),
            ("05-01-2026", "Ocany 350", "41"),
        ]);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let merged = merge_upsert(&old, "Date", date, &new_rows);

        // Other dates untouched, matching date fully replaced.
        assert_eq!(merged.rows.len(), 4);
        assert_eq!(merged.rows[0][0], "04-01-2026");
        assert_eq!(merged.rows[1][0], "06-01-2026");
        assert_eq!(merged.rows[2], vec!["05-01-2026", "Aqua 500", "72"]);
        assert_eq!(merged.rows[3], vec!["05-01-2026", "Ocany 350", "41"]);
    }

    #[test]
    fn test_merge_upsert_matches_across_date_formats() {
        // The same calendar day written three ways must all be replaced.
        let old = close_table(&[
            ("05-01-2026", "Aqua 500", "70"),
            ("05/01/2026", "Ocany 350", "40"),
            ("2026-01-05", "Aqua 5l", "12"),
            ("06-01-2026", "Aqua 500", "65"),
        ]);
        let new_rows = close_table(&[("05-01-2026", "Aqua 500", "71")]);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let merged = merge_upsert(&old, "Date", date, &new_rows);
        assert_eq!(merged.rows.len(), 2);
        assert_eq!(merged.rows[0][0], "06-01-2026");
        assert_eq!(merged.rows[1][2], "71");
    }

    #[test]
    fn test_merge_upsert_into_empty_table() {
        let old = Table::new(&["Date", "Item", "Closing stock"]);
        let new_rows = close_table(&[("05-01-2026", "Aqua 500", "70")]);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let merged = merge_upsert(&old, "Date", date, &new_rows);
        assert_eq!(merged.rows.len(), 1);
        assert_eq!(merged.headers, new_rows.headers);
    }

    #[test]
    fn test_merge_upsert_retains_extra_old_columns() {
        let mut old = Table::new(&["Date", "Item", "Closing stock", "Audited"]);
        old.push_row(vec!["04-01-2026".into(), "Aqua 500".into(), "80".into(), "yes".into()]);
        let new_rows = close_table(&[("05-01-2026", "Aqua 500", "70")]);
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let merged = merge_upsert(&old, "Date", date, &new_rows);
        assert_eq!(
            merged.headers,
            vec!["Date", "Item", "Closing stock", "Audited"]
        );
        assert_eq!(merged.rows[0][3], "yes");
        // New rows have no value for the extra column.
        assert_eq!(merged.rows[1][3], "");
    }

    #[test]
    fn test_worksheet_specs_lead_with_date_column() {
        for spec in [MOTORBIKE_ORDERS, CAR_ORDERS, DAILY_CLOSE, STOCK_IN, ATTENDANCE] {
            assert_eq!(spec.headers[0], "Date", "{} must be date-keyed", spec.title);
        }
    }
}
