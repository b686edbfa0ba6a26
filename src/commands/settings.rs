//! Spreadsheet connection and settings commands.

use serde_json::{json, Value};
use tracing::info;

use crate::{sheets, storage};

#[tauri::command]
pub fn settings_is_configured() -> Result<Value, String> {
    Ok(json!({ "configured": storage::is_configured() }))
}

/// Store the spreadsheet connection from onboarding (explicit fields or a
/// pasted connection string).
#[tauri::command]
pub fn settings_update_connection(arg0: Option<Value>) -> Result<Value, String> {
    let payload = arg0.unwrap_or_else(|| json!({}));
    // A bare pasted string is treated as a connection string.
    let payload = match payload {
        Value::String(s) => json!({ "connectionString": s }),
        other => other,
    };
    storage::update_connection(&payload)
}

#[tauri::command]
pub fn settings_get_full_config() -> Result<Value, String> {
    Ok(storage::get_full_config())
}

#[tauri::command]
pub fn settings_clear_connection() -> Result<Value, String> {
    info!("disconnecting spreadsheet");
    storage::clear_connection()
}

/// Lightweight connectivity test against the stored connection.
#[tauri::command]
pub async fn sheets_test_connection() -> Result<Value, String> {
    let Some(spreadsheet_id) = storage::get_credential(storage::KEY_SPREADSHEET_ID) else {
        return Ok(json!({
            "success": false,
            "error": "Spreadsheet connection is not configured",
        }));
    };
    let Some(token) = storage::get_credential(storage::KEY_API_TOKEN) else {
        return Ok(json!({
            "success": false,
            "error": "Spreadsheet connection is not configured",
        }));
    };
    let base_url = storage::get_credential(storage::KEY_BASE_URL).unwrap_or_default();

    let result = sheets::test_connectivity(&base_url, &spreadsheet_id, &token).await;
    serde_json::to_value(result).map_err(|e| e.to_string())
}
