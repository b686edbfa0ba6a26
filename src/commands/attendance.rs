//! Attendance commands.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::attendance::{self, ShiftKind};
use crate::{commands, dates, tables, SheetsState};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AttendancePayload {
    #[serde(default)]
    date: String,
    #[serde(default, alias = "name", alias = "staff")]
    employee: String,
    #[serde(default)]
    shift: String,
    #[serde(default)]
    note: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MonthPayload {
    #[serde(default)]
    month: String,
}

/// Normalize a month argument ("01/2026", "2026-01", or any date in the
/// month) to the canonical mm/yyyy key.
pub(crate) fn parse_month_key(arg0: Option<Value>) -> Result<String, String> {
    let raw = match arg0 {
        Some(Value::String(s)) => s,
        Some(value) => {
            let parsed: MonthPayload = serde_json::from_value(value)
                .map_err(|e| format!("Invalid month payload: {e}"))?;
            parsed.month
        }
        None => String::new(),
    };
    let raw = raw.trim();
    dates::parse_month(raw)
        .or_else(|| dates::parse_flexible(raw))
        .map(dates::month_key)
        .ok_or_else(|| format!("Unrecognized month: {raw}"))
}

#[tauri::command]
pub async fn attendance_record(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: AttendancePayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid attendance payload: {e}"))?;
    let date = dates::parse_flexible(&payload.date)
        .ok_or_else(|| format!("Unrecognized date: {}", payload.date))?;
    let employee = payload.employee.trim().to_string();
    if employee.is_empty() {
        return Err("Missing employee name".into());
    }
    let shift = ShiftKind::parse(&payload.shift)?;

    let client = commands::client(&state)?;
    let date_str = dates::format_date(date);
    tables::append_row(
        &client,
        tables::ATTENDANCE,
        vec![
            date_str.clone(),
            employee.clone(),
            shift.label().to_string(),
            format!("{}", shift.credit()),
            payload.note.trim().to_string(),
        ],
    )
    .await
    .map_err(|e| e.to_string())?;

    info!(date = %date_str, employee = %employee, shift = shift.label(), "attendance recorded");
    Ok(json!({ "success": true, "date": date_str, "credit": shift.credit() }))
}

#[tauri::command]
pub async fn attendance_list_month(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let month = parse_month_key(arg0)?;
    let client = commands::client(&state)?;
    let table = tables::read_table(&client, tables::ATTENDANCE)
        .await
        .map_err(|e| e.to_string())?;
    let rows = attendance::rows_for_month(&table, &month);
    Ok(json!({ "month": month, "rows": rows.to_json_rows() }))
}

/// Credited work days per employee for one month.
#[tauri::command]
pub async fn attendance_month_totals(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let month = parse_month_key(arg0)?;
    let client = commands::client(&state)?;
    let table = tables::read_table(&client, tables::ATTENDANCE)
        .await
        .map_err(|e| e.to_string())?;
    let totals = attendance::month_totals(&table, &month);
    Ok(json!({ "month": month, "totals": totals }))
}
