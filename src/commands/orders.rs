//! Order entry and listing commands.

use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::orders::{self, OrderSource};
use crate::{commands, dates, tables, SheetsState};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MotorbikeOrderPayload {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    customer: String,
    #[serde(default)]
    code: String,
    #[serde(default)]
    street: String,
    #[serde(default)]
    product: String,
    #[serde(default)]
    container: String,
    #[serde(default)]
    quantity: f64,
    #[serde(default, alias = "empties_returned", alias = "empties")]
    empties_returned: String,
    #[serde(default)]
    paid: f64,
    #[serde(default, alias = "payment_method")]
    payment_method: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    shipper: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CarOrderPayload {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    customer: String,
    #[serde(default)]
    product: String,
    #[serde(default)]
    container: String,
    #[serde(default)]
    quantity: f64,
    #[serde(default, alias = "unit_price", alias = "price")]
    unit_price: f64,
    #[serde(default)]
    paid: f64,
    #[serde(default, alias = "payment_method")]
    payment_method: String,
    #[serde(default)]
    note: String,
    #[serde(default, alias = "shipper_1")]
    shipper1: String,
    #[serde(default, alias = "shipper_2")]
    shipper2: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct OrderListPayload {
    #[serde(default)]
    source: String,
    #[serde(default, alias = "from_date", alias = "startDate")]
    from: Option<String>,
    #[serde(default, alias = "to_date", alias = "endDate")]
    to: Option<String>,
}

/// Resolve an order date: canonicalize a provided one, default to today.
fn order_date(raw: Option<&str>) -> Result<String, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => dates::parse_flexible(raw)
            .map(dates::format_date)
            .ok_or_else(|| format!("Unrecognized date: {raw}")),
        None => Ok(dates::format_date(Local::now().date_naive())),
    }
}

fn reject_negative(label: &str, value: f64) -> Result<(), String> {
    if value < 0.0 {
        return Err(format!("{label} cannot be negative"));
    }
    Ok(())
}

fn format_qty(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[tauri::command]
pub async fn order_create_motorbike(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: MotorbikeOrderPayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid motorbike order payload: {e}"))?;
    let date = order_date(payload.date.as_deref())?;
    reject_negative("Quantity", payload.quantity)?;
    reject_negative("Paid", payload.paid)?;

    let client = commands::client(&state)?;
    let row = vec![
        date.clone(),
        payload.customer.trim().to_string(),
        payload.code.trim().to_string(),
        payload.street.trim().to_string(),
        payload.product.trim().to_string(),
        payload.container.trim().to_string(),
        format_qty(payload.quantity),
        payload.empties_returned.trim().to_string(),
        format_qty(payload.paid),
        payload.payment_method.trim().to_string(),
        payload.note.trim().to_string(),
        payload.shipper.trim().to_string(),
    ];
    tables::append_row(&client, tables::MOTORBIKE_ORDERS, row)
        .await
        .map_err(|e| e.to_string())?;

    info!(date = %date, customer = %payload.customer, "motorbike order recorded");
    Ok(json!({ "success": true, "date": date }))
}

#[tauri::command]
pub async fn order_create_car(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: CarOrderPayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid car order payload: {e}"))?;
    let date = order_date(payload.date.as_deref())?;
    reject_negative("Quantity", payload.quantity)?;
    reject_negative("Unit price", payload.unit_price)?;
    reject_negative("Paid", payload.paid)?;
    let revenue = orders::car_revenue(payload.quantity, payload.unit_price, payload.paid);

    let client = commands::client(&state)?;
    let row = vec![
        date.clone(),
        payload.customer.trim().to_string(),
        payload.product.trim().to_string(),
        payload.container.trim().to_string(),
        format_qty(payload.quantity),
        format_qty(payload.unit_price),
        format_qty(payload.paid),
        payload.payment_method.trim().to_string(),
        payload.note.trim().to_string(),
        payload.shipper1.trim().to_string(),
        payload.shipper2.trim().to_string(),
    ];
    tables::append_row(&client, tables::CAR_ORDERS, row)
        .await
        .map_err(|e| e.to_string())?;

    info!(date = %date, customer = %payload.customer, revenue, "car order recorded");
    Ok(json!({ "success": true, "date": date, "revenue": revenue }))
}

/// List orders from one table over an inclusive date range, with totals.
#[tauri::command]
pub async fn order_list(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: OrderListPayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid order list payload: {e}"))?;
    let source = OrderSource::parse(&payload.source)?;
    let from = payload.from.as_deref().and_then(dates::parse_flexible);
    let to = payload.to.as_deref().and_then(dates::parse_flexible);

    let client = commands::client(&state)?;
    let table = tables::read_table(&client, source.spec())
        .await
        .map_err(|e| e.to_string())?;
    let filtered = orders::filter_by_range(&table, from, to);

    Ok(json!({
        "source": source.name(),
        "count": filtered.rows.len(),
        "rows": filtered.to_json_rows(),
        "summary": orders::summary(source, &filtered),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_date_canonicalizes_or_defaults() {
        assert_eq!(order_date(Some("2026-01-05")).unwrap(), "05-01-2026");
        assert_eq!(order_date(Some("05/01/2026")).unwrap(), "05-01-2026");
        assert!(order_date(Some("yesterday")).is_err());
        // Blank falls back to today, which always round-trips.
        let today = order_date(None).unwrap();
        assert!(dates::parse_flexible(&today).is_some());
    }

    #[test]
    fn test_reject_negative() {
        assert!(reject_negative("Quantity", 0.0).is_ok());
        assert!(reject_negative("Quantity", 3.0).is_ok());
        assert!(reject_negative("Quantity", -1.0).is_err());
    }

    #[test]
    fn test_format_qty_drops_trailing_zeroes() {
        assert_eq!(format_qty(0.0), "");
        assert_eq!(format_qty(4.0), "4");
        assert_eq!(format_qty(2.5), "2.5");
    }

    #[test]
    fn test_motorbike_payload_accepts_aliases() {
        let payload: MotorbikeOrderPayload = serde_json::from_value(json!({
            "date": "05-01-2026",
            "customer": "Hoa",
            "empties": "x",
            "payment_method": "cash",
        }))
        .unwrap();
        assert_eq!(payload.empties_returned, "x");
        assert_eq!(payload.payment_method, "cash");
    }
}
