//! IPC command handlers, grouped per area of the app.

pub mod attendance;
pub mod inventory;
pub mod lookups;
pub mod orders;
pub mod payroll;
pub mod reports;
pub mod runtime;
pub mod settings;

use crate::sheets::SheetsClient;
use crate::SheetsState;

/// Build a spreadsheet client from the stored connection and the shared
/// HTTP handle. Every data command starts here.
pub(crate) fn client(state: &tauri::State<'_, SheetsState>) -> Result<SheetsClient, String> {
    SheetsClient::from_storage(state.http.clone()).map_err(|e| e.to_string())
}
