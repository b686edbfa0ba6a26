//! Spreadsheet connection storage using the OS credential store.
//!
//! On Windows this uses DPAPI (via the `keyring` crate), on macOS Keychain,
//! and on Linux the Secret Service API. The stored connection is the only
//! local state the app keeps; every worksheet lives remotely.

use keyring::Entry;
use serde_json::Value;
use tracing::{info, warn};

const SERVICE_NAME: &str = "aqua-ledger";

// Credential keys
pub const KEY_SPREADSHEET_ID: &str = "spreadsheet_id";
pub const KEY_API_TOKEN: &str = "sheets_api_token";
pub const KEY_BASE_URL: &str = "sheets_api_url";

/// All credential keys managed by this module.
const ALL_KEYS: &[&str] = &[KEY_SPREADSHEET_ID, KEY_API_TOKEN, KEY_BASE_URL];

// ---------------------------------------------------------------------------
// Low-level helpers
// ---------------------------------------------------------------------------

/// Retrieve a single credential from the OS keyring. Returns `None` when the
/// entry does not exist (or the platform returns a "not found" error).
pub fn get_credential(key: &str) -> Option<String> {
    let entry = match Entry::new(SERVICE_NAME, key) {
        Ok(e) => e,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to create entry");
            return None;
        }
    };
    match entry.get_password() {
        Ok(pw) => Some(pw),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to read credential");
            None
        }
    }
}

/// Store a credential in the OS keyring.
pub fn set_credential(key: &str, value: &str) -> Result<(), String> {
    let entry = Entry::new(SERVICE_NAME, key).map_err(|e| e.to_string())?;
    entry.set_password(value).map_err(|e| e.to_string())?;
    Ok(())
}

/// Delete a credential from the OS keyring. Silently succeeds if the entry
/// does not exist.
pub fn delete_credential(key: &str) -> Result<(), String> {
    let entry = Entry::new(SERVICE_NAME, key).map_err(|e| e.to_string())?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn has_credential(key: &str) -> bool {
    get_credential(key).is_some()
}

// ---------------------------------------------------------------------------
// High-level API
// ---------------------------------------------------------------------------

/// The app is considered configured once a spreadsheet id and access token
/// are stored. The base URL is optional (a hosted default applies).
pub fn is_configured() -> bool {
    has_credential(KEY_SPREADSHEET_ID) && has_credential(KEY_API_TOKEN)
}

/// Mask a secret for display: first four characters plus an ellipsis.
pub fn mask_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.chars().count() <= 4 {
        "****".to_string()
    } else {
        let head: String = trimmed.chars().take(4).collect();
        format!("{head}\u{2026}")
    }
}

/// Stored connection as a JSON value for the settings screen. The token is
/// masked; the frontend never needs it back in full.
pub fn get_full_config() -> Value {
    serde_json::json!({
        "spreadsheet_id": get_credential(KEY_SPREADSHEET_ID),
        "base_url": get_credential(KEY_BASE_URL),
        "api_token": get_credential(KEY_API_TOKEN).map(|t| mask_secret(&t)),
    })
}

/// Store the spreadsheet connection received during onboarding.
///
/// Accepts either explicit fields or a pasted connection string (raw JSON or
/// base64url JSON) under `connectionString`:
/// ```json
/// { "spreadsheetId": "...", "apiToken": "...", "baseUrl": "..." }
/// ```
pub fn update_connection(payload: &Value) -> Result<Value, String> {
    let connection_string = payload
        .get("connectionString")
        .or_else(|| payload.get("connection_string"))
        .and_then(Value::as_str)
        .unwrap_or("");

    let mut spreadsheet_id = payload
        .get("spreadsheetId")
        .or_else(|| payload.get("spreadsheet_id"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let mut token = payload
        .get("apiToken")
        .or_else(|| payload.get("api_token"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let mut base_url = payload
        .get("baseUrl")
        .or_else(|| payload.get("base_url"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if !connection_string.trim().is_empty() {
        if let Some(sid) =
            crate::sheets::extract_spreadsheet_id_from_connection_string(connection_string)
        {
            spreadsheet_id = Some(sid);
        }
        if let Some(key) = crate::sheets::extract_token_from_connection_string(connection_string) {
            token = Some(key);
        }
        if let Some(url) = crate::sheets::extract_base_url_from_connection_string(connection_string)
        {
            base_url = Some(url);
        }
    }

    let spreadsheet_id = spreadsheet_id.ok_or("Missing required field: spreadsheetId")?;
    let token = token.ok_or("Missing required field: apiToken")?;

    set_credential(KEY_SPREADSHEET_ID, &spreadsheet_id)?;
    set_credential(KEY_API_TOKEN, &token)?;

    if let Some(url) = base_url.as_deref() {
        let normalized = crate::sheets::normalize_base_url(url);
        if !normalized.trim().is_empty() {
            set_credential(KEY_BASE_URL, normalized.trim())?;
        }
    }

    info!(spreadsheet_id = %spreadsheet_id, "spreadsheet connection updated");
    Ok(serde_json::json!({ "success": true }))
}

/// Delete every stored credential (disconnect).
pub fn clear_connection() -> Result<Value, String> {
    info!("clearing spreadsheet connection credentials");
    for key in ALL_KEYS {
        delete_credential(key)?;
    }
    Ok(serde_json::json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("secret-token"), "secr\u{2026}");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
