//! Daily closing, stock-in, and reconciliation commands.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::table::Table;
use crate::{commands, dates, inventory, tables, SheetsState};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ClosingEntry {
    #[serde(default)]
    item: String,
    #[serde(default, alias = "closing_stock", alias = "quantity")]
    closing: f64,
    #[serde(default)]
    note: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ClosingDayPayload {
    #[serde(default)]
    date: String,
    #[serde(default)]
    entries: Vec<ClosingEntry>,
    #[serde(default, alias = "recorded_by")]
    recorded_by: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StockInEntry {
    #[serde(default)]
    item: String,
    #[serde(default)]
    quantity: f64,
    #[serde(default)]
    note: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StockInPayload {
    #[serde(default)]
    date: String,
    #[serde(default)]
    entries: Vec<StockInEntry>,
    #[serde(default, alias = "recorded_by")]
    recorded_by: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DatePayload {
    #[serde(default)]
    date: String,
}

fn parse_date(arg0: Option<Value>) -> Result<chrono::NaiveDate, String> {
    let raw = match arg0 {
        Some(Value::String(s)) => s,
        Some(value) => {
            let parsed: DatePayload = serde_json::from_value(value)
                .map_err(|e| format!("Invalid date payload: {e}"))?;
            parsed.date
        }
        None => String::new(),
    };
    dates::parse_flexible(&raw).ok_or_else(|| format!("Unrecognized date: {raw}"))
}

fn format_stock(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Append one closing-stock row (quick single-item entry).
#[tauri::command]
pub async fn inventory_record_closing(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    #[derive(Debug, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        #[serde(default)]
        date: String,
        #[serde(flatten)]
        entry: ClosingEntry,
        #[serde(default, alias = "recorded_by")]
        recorded_by: String,
    }

    let payload: Payload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid closing payload: {e}"))?;
    let date = dates::parse_flexible(&payload.date)
        .ok_or_else(|| format!("Unrecognized date: {}", payload.date))?;
    let item = payload.entry.item.trim().to_string();
    if item.is_empty() {
        return Err("Missing item name".into());
    }
    let date_str = dates::format_date(date);

    let client = commands::client(&state)?;
    tables::append_row(
        &client,
        tables::DAILY_CLOSE,
        vec![
            date_str.clone(),
            item.clone(),
            format_stock(payload.entry.closing),
            payload.entry.note.trim().to_string(),
            payload.recorded_by.trim().to_string(),
        ],
    )
    .await
    .map_err(|e| e.to_string())?;

    info!(date = %date_str, item = %item, "closing stock recorded");
    Ok(json!({ "success": true, "date": date_str }))
}

/// Replace one day's closing-stock rows. Entries with a blank item are
/// dropped; saving an empty list clears the day.
#[tauri::command]
pub async fn inventory_save_closing_day(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: ClosingDayPayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid closing payload: {e}"))?;
    let date = dates::parse_flexible(&payload.date)
        .ok_or_else(|| format!("Unrecognized date: {}", payload.date))?;
    let date_str = dates::format_date(date);
    let recorded_by = payload.recorded_by.trim().to_string();

    let mut new_rows = Table::new(tables::DAILY_CLOSE.headers);
    for entry in &payload.entries {
        let item = entry.item.trim();
        if item.is_empty() {
            continue;
        }
        new_rows.push_row(vec![
            date_str.clone(),
            item.to_string(),
            format_stock(entry.closing),
            entry.note.trim().to_string(),
            recorded_by.clone(),
        ]);
    }

    let client = commands::client(&state)?;
    tables::upsert_by_date(&client, tables::DAILY_CLOSE, "Date", date, &new_rows)
        .await
        .map_err(|e| e.to_string())?;

    info!(date = %date_str, items = new_rows.rows.len(), "daily closing saved");
    Ok(json!({ "success": true, "date": date_str, "items": new_rows.rows.len() }))
}

#[tauri::command]
pub async fn inventory_closing_for_date(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let date = parse_date(arg0)?;
    let client = commands::client(&state)?;
    let table = tables::read_table(&client, tables::DAILY_CLOSE)
        .await
        .map_err(|e| e.to_string())?;
    let rows = tables::rows_for_date(&table, "Date", date);
    Ok(json!({ "date": dates::format_date(date), "rows": rows.to_json_rows() }))
}

/// Append stock-in receipts for a day. Stock-in is a log, not a snapshot,
/// so repeated saves accumulate.
#[tauri::command]
pub async fn inventory_record_stock_in(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: StockInPayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid stock-in payload: {e}"))?;
    let date = dates::parse_flexible(&payload.date)
        .ok_or_else(|| format!("Unrecognized date: {}", payload.date))?;
    let date_str = dates::format_date(date);
    let recorded_by = payload.recorded_by.trim().to_string();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for entry in &payload.entries {
        let item = entry.item.trim();
        if item.is_empty() || entry.quantity == 0.0 {
            continue;
        }
        rows.push(vec![
            date_str.clone(),
            item.to_string(),
            format_stock(entry.quantity),
            entry.note.trim().to_string(),
            recorded_by.clone(),
        ]);
    }
    if rows.is_empty() {
        return Err("No stock-in entries to record".into());
    }

    let client = commands::client(&state)?;
    tables::ensure_worksheet(&client, tables::STOCK_IN)
        .await
        .map_err(|e| e.to_string())?;
    let count = rows.len();
    client
        .append_values(tables::STOCK_IN.title, rows)
        .await
        .map_err(|e| e.to_string())?;

    info!(date = %date_str, entries = count, "stock-in recorded");
    Ok(json!({ "success": true, "date": date_str, "entries": count }))
}

#[tauri::command]
pub async fn inventory_stock_in_for_date(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let date = parse_date(arg0)?;
    let client = commands::client(&state)?;
    let table = tables::read_table(&client, tables::STOCK_IN)
        .await
        .map_err(|e| e.to_string())?;
    let rows = tables::rows_for_date(&table, "Date", date);
    Ok(json!({ "date": dates::format_date(date), "rows": rows.to_json_rows() }))
}

/// Reconcile one day: expected outflow (prior closing + stock-in − closing)
/// against the deliveries actually written into the order tables.
#[tauri::command]
pub async fn inventory_reconcile(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let date = parse_date(arg0)?;
    let client = commands::client(&state)?;

    let daily_close = tables::read_table(&client, tables::DAILY_CLOSE)
        .await
        .map_err(|e| e.to_string())?;
    let stock_in = tables::read_table(&client, tables::STOCK_IN)
        .await
        .map_err(|e| e.to_string())?;
    let motorbike = tables::read_table(&client, tables::MOTORBIKE_ORDERS)
        .await
        .map_err(|e| e.to_string())?;
    let car = tables::read_table(&client, tables::CAR_ORDERS)
        .await
        .map_err(|e| e.to_string())?;

    let rows = inventory::reconcile_day(&daily_close, &stock_in, &[&motorbike, &car], date);
    let rows = serde_json::to_value(rows).map_err(|e| e.to_string())?;
    Ok(json!({ "date": dates::format_date(date), "rows": rows }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_string_and_object() {
        let from_string = parse_date(Some(json!("05-01-2026"))).unwrap();
        let from_object = parse_date(Some(json!({ "date": "2026-01-05" }))).unwrap();
        assert_eq!(from_string, from_object);
        assert!(parse_date(Some(json!("not-a-date"))).is_err());
        assert!(parse_date(None).is_err());
    }

    #[test]
    fn test_format_stock() {
        assert_eq!(format_stock(70.0), "70");
        assert_eq!(format_stock(2.5), "2.5");
    }
}
