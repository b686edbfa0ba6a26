//! Monthly payroll commands.

use serde_json::{json, Value};
use tracing::info;

use crate::orders::OrderSource;
use crate::payroll::PayrollRow;
use crate::sheets::SheetsClient;
use crate::{attendance, commands, payroll, tables, SheetsState};

async fn compute_month(client: &SheetsClient, month: &str) -> Result<Vec<PayrollRow>, String> {
    let attendance_table = tables::read_table(client, tables::ATTENDANCE)
        .await
        .map_err(|e| e.to_string())?;
    let motorbike = tables::read_table(client, tables::MOTORBIKE_ORDERS)
        .await
        .map_err(|e| e.to_string())?;
    let car = tables::read_table(client, tables::CAR_ORDERS)
        .await
        .map_err(|e| e.to_string())?;
    let pay_rules_table = tables::read_table(client, tables::PAY_RULES)
        .await
        .map_err(|e| e.to_string())?;
    let commission_table = tables::read_table(client, tables::COMMISSION_RULES)
        .await
        .map_err(|e| e.to_string())?;

    let totals = attendance::month_totals(&attendance_table, month);
    let sales = payroll::staff_sales_for_month(
        &[(OrderSource::Motorbike, &motorbike), (OrderSource::Car, &car)],
        month,
    );
    let pay_rules = payroll::pay_rules_from(&pay_rules_table);
    let commission_rules = payroll::commission_rules_from(&commission_table);

    Ok(payroll::compute(month, &totals, &sales, &pay_rules, &commission_rules))
}

fn rows_response(month: &str, rows: &[PayrollRow]) -> Result<Value, String> {
    let total: f64 = rows.iter().map(|r| r.total_pay).sum();
    let rows = serde_json::to_value(rows).map_err(|e| e.to_string())?;
    Ok(json!({ "month": month, "rows": rows, "totalPay": total }))
}

/// Compute the pay table for one month without persisting it.
#[tauri::command]
pub async fn payroll_compute(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let month = super::attendance::parse_month_key(arg0)?;
    let client = commands::client(&state)?;
    let rows = compute_month(&client, &month).await?;
    rows_response(&month, &rows)
}

/// Recompute one month and write it into the payroll sheet, replacing any
/// rows previously saved for that month.
#[tauri::command]
pub async fn payroll_save(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let month = super::attendance::parse_month_key(arg0)?;
    let client = commands::client(&state)?;
    let rows = compute_month(&client, &month).await?;

    let existing = tables::read_table(&client, tables::PAYROLL)
        .await
        .map_err(|e| e.to_string())?;
    let merged = payroll::merge_month(&existing, &month, &rows);
    tables::overwrite_table(&client, tables::PAYROLL, &merged)
        .await
        .map_err(|e| e.to_string())?;

    info!(month = %month, employees = rows.len(), "payroll saved");
    rows_response(&month, &rows)
}

/// Previously saved payroll rows for one month.
#[tauri::command]
pub async fn payroll_saved_month(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let month = super::attendance::parse_month_key(arg0)?;
    let client = commands::client(&state)?;
    let table = tables::read_table(&client, tables::PAYROLL)
        .await
        .map_err(|e| e.to_string())?;

    let header_refs: Vec<&str> = table.headers.iter().map(|h| h.as_str()).collect();
    let mut rows = crate::table::Table::new(&header_refs);
    for idx in 0..table.rows.len() {
        if table.cell(idx, "Month").trim() == month {
            rows.push_row(table.rows[idx].clone());
        }
    }
    Ok(json!({ "month": month, "rows": rows.to_json_rows() }))
}
