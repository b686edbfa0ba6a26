//! Aqua Ledger - Tauri v2 Backend
//!
//! Desktop back office for a water delivery business, persisted in a shared
//! remote spreadsheet. This module wires up logging and registers the IPC
//! command handlers the frontend calls via `@tauri-apps/api/core::invoke()`.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod attendance;
mod commands;
mod dates;
mod diagnostics;
mod inventory;
mod lookups;
mod orders;
mod payroll;
mod reports;
mod sheets;
mod storage;
mod table;
mod tables;

/// Shared runtime state: one HTTP connection pool reused by every
/// spreadsheet client.
pub(crate) struct SheetsState {
    pub http: reqwest::Client,
}

// ============================================================================
// App entry point
// ============================================================================

pub fn run() {
    // Structured logging: console + rolling daily file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,aqua_ledger_lib=debug"));

    // Prune old log files before setting up the appender
    diagnostics::prune_old_logs();

    let log_dir = diagnostics::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&log_dir, diagnostics::LOG_FILE_PREFIX);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let console_layer = fmt::layer().with_target(true);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    // Keep the guard alive for the lifetime of the app; dropping it flushes logs.
    // We leak it intentionally since the app runs until process exit.
    std::mem::forget(_guard);

    info!("Starting Aqua Ledger v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .setup(|app| {
            use tauri::Manager;

            let http = reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?;
            app.manage(SheetsState { http });

            info!(configured = storage::is_configured(), "spreadsheet client registered");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // App lifecycle
            commands::runtime::app_shutdown,
            commands::runtime::app_restart,
            commands::runtime::app_get_version,
            commands::runtime::system_get_info,
            commands::runtime::diagnostics_get_about,
            commands::runtime::diagnostics_get_log_dir,
            // Connection settings
            commands::settings::settings_is_configured,
            commands::settings::settings_update_connection,
            commands::settings::settings_get_full_config,
            commands::settings::settings_clear_connection,
            commands::settings::sheets_test_connection,
            // Lookup catalog
            commands::lookups::lookup_get_categories,
            commands::lookups::lookup_get_options,
            commands::lookups::lookup_add_value,
            commands::lookups::lookup_get_all,
            // Orders
            commands::orders::order_create_motorbike,
            commands::orders::order_create_car,
            commands::orders::order_list,
            // Reports
            commands::reports::report_revenue,
            // Inventory
            commands::inventory::inventory_record_closing,
            commands::inventory::inventory_save_closing_day,
            commands::inventory::inventory_closing_for_date,
            commands::inventory::inventory_record_stock_in,
            commands::inventory::inventory_stock_in_for_date,
            commands::inventory::inventory_reconcile,
            // Attendance
            commands::attendance::attendance_record,
            commands::attendance::attendance_list_month,
            commands::attendance::attendance_month_totals,
            // Payroll
            commands::payroll::payroll_compute,
            commands::payroll::payroll_save,
            commands::payroll::payroll_saved_month,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Aqua Ledger");
}
