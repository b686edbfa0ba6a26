//! App lifecycle and diagnostics commands.

use serde_json::{json, Value};
use tauri::Emitter;
use tracing::info;

use crate::{diagnostics, storage};

#[tauri::command]
pub async fn app_shutdown(app: tauri::AppHandle) -> Result<(), String> {
    info!("app:shutdown requested");
    let _ = app.emit("app_close", json!({ "reason": "shutdown" }));
    app.exit(0);
    Ok(())
}

#[tauri::command]
pub async fn app_restart(app: tauri::AppHandle) -> Result<(), String> {
    info!("app:restart requested");
    let _ = app.emit("app_close", json!({ "reason": "restart" }));
    app.restart();
}

#[tauri::command]
pub async fn app_get_version() -> Result<Value, String> {
    Ok(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

#[tauri::command]
pub async fn system_get_info() -> Result<Value, String> {
    Ok(json!({
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "version": env!("CARGO_PKG_VERSION"),
        "is_configured": storage::is_configured(),
    }))
}

#[tauri::command]
pub async fn diagnostics_get_about() -> Result<Value, String> {
    Ok(diagnostics::about_info())
}

#[tauri::command]
pub async fn diagnostics_get_log_dir() -> Result<Value, String> {
    Ok(json!({ "logDir": diagnostics::get_log_dir().display().to_string() }))
}
