//! Spreadsheet service REST client.
//!
//! Thin authenticated wrapper over the remote spreadsheet's values API, used
//! by the worksheet operations in `tables.rs`. Speaks the Google Sheets v4
//! wire shape: `values/{range}` get/append/clear/update plus `batchUpdate`
//! for creating worksheet tabs.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

use crate::storage;

/// Default timeout for values API requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout used specifically for the lightweight connectivity test.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URL used when the connection string does not carry one.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Spreadsheet connection is not configured")]
    NotConfigured,
    #[error("Worksheet not found: {0}")]
    MissingWorksheet(String),
    #[error("{0}")]
    Http(String),
    #[error("{0}")]
    Status(String),
    #[error("Invalid response from spreadsheet service: {0}")]
    BadResponse(String),
}

// ---------------------------------------------------------------------------
// URL normalisation and connection strings
// ---------------------------------------------------------------------------

/// Normalise the spreadsheet service base URL:
/// - strip trailing slashes
/// - strip a trailing `/v4` segment (we add it per request)
/// - ensure a scheme is present (https, or http for localhost)
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if url.is_empty() {
        return url;
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    if url.ends_with("/v4") {
        url.truncate(url.len() - 3);
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

fn decode_connection_string_payload(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str::<Value>(trimmed).ok();
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with('{') {
        return serde_json::from_str::<Value>(&compact).ok();
    }
    if compact.len() < 20 {
        return None;
    }

    let base64 = compact.replace('-', "+").replace('_', "/");
    let padded = format!(
        "{}{}",
        base64,
        "=".repeat((4usize.wrapping_sub(base64.len() % 4)) % 4)
    );
    let decoded = BASE64_STANDARD.decode(padded).ok()?;
    serde_json::from_slice::<Value>(&decoded).ok()
}

fn connection_field(raw: &str, keys: &[&str]) -> Option<String> {
    decode_connection_string_payload(raw)
        .and_then(|v| {
            keys.iter().find_map(|key| {
                v.get(*key)
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string())
            })
        })
        .filter(|s| !s.is_empty())
}

pub fn extract_spreadsheet_id_from_connection_string(raw: &str) -> Option<String> {
    connection_field(raw, &["sid", "spreadsheetId", "spreadsheet_id"])
}

pub fn extract_token_from_connection_string(raw: &str) -> Option<String> {
    connection_field(raw, &["key", "token", "apiKey"])
}

pub fn extract_base_url_from_connection_string(raw: &str) -> Option<String> {
    connection_field(raw, &["url", "baseUrl", "base_url"])
        .map(|u| normalize_base_url(&u))
        .filter(|u| !u.is_empty())
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-facing message.
fn friendly_error(url: &str, err: &reqwest::Error) -> SheetError {
    if err.is_connect() {
        return SheetError::Http(format!("Cannot reach spreadsheet service at {url}"));
    }
    if err.is_timeout() {
        return SheetError::Http(format!("Connection to {url} timed out"));
    }
    if err.is_builder() {
        return SheetError::Http(format!("Invalid spreadsheet service URL: {url}"));
    }
    SheetError::Http(format!("Network error communicating with {url}: {err}"))
}

/// Convert an HTTP status code into a user-facing message.
fn status_error(status: StatusCode) -> SheetError {
    SheetError::Status(match status.as_u16() {
        401 => "Spreadsheet access token is invalid or expired".to_string(),
        403 => "Not authorized to open this spreadsheet".to_string(),
        404 => "Spreadsheet not found (check the spreadsheet id)".to_string(),
        429 => "Spreadsheet service rate limit reached".to_string(),
        s if s >= 500 => format!("Spreadsheet service error (HTTP {s})"),
        s => format!("Unexpected response from spreadsheet service (HTTP {s})"),
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated handle on one remote spreadsheet.
pub struct SheetsClient {
    http: Client,
    base: String,
    spreadsheet_id: String,
    token: String,
}

impl SheetsClient {
    /// Build a client from the stored connection. Fails with `NotConfigured`
    /// until onboarding has stored a spreadsheet id and token.
    pub fn from_storage(http: Client) -> Result<Self, SheetError> {
        let spreadsheet_id =
            storage::get_credential(storage::KEY_SPREADSHEET_ID).ok_or(SheetError::NotConfigured)?;
        let token =
            storage::get_credential(storage::KEY_API_TOKEN).ok_or(SheetError::NotConfigured)?;
        if spreadsheet_id.trim().is_empty() || token.trim().is_empty() {
            return Err(SheetError::NotConfigured);
        }
        let base = storage::get_credential(storage::KEY_BASE_URL)
            .map(|u| normalize_base_url(&u))
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            http,
            base,
            spreadsheet_id: spreadsheet_id.trim().to_string(),
            token: token.trim().to_string(),
        })
    }

    fn values_url(&self, worksheet: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.base, self.spreadsheet_id, worksheet, suffix
        )
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, SheetError> {
        req.bearer_auth(&self.token)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await
            .map_err(|e| friendly_error(&self.base, &e))
    }

    /// Read a whole worksheet as a raw value grid. A missing worksheet is
    /// reported as `MissingWorksheet` (the service answers unknown ranges
    /// with 400, a deleted spreadsheet with 404).
    pub async fn get_values(&self, worksheet: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let resp = self
            .send(self.http.get(self.values_url(worksheet, "")))
            .await?;
        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(SheetError::MissingWorksheet(worksheet.to_string()));
        }
        if !status.is_success() {
            return Err(status_error(status));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SheetError::BadResponse(e.to_string()))?;
        Ok(values_from_body(&body))
    }

    /// Append raw rows below the worksheet's current data.
    pub async fn append_values(
        &self,
        worksheet: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError> {
        let url = self.values_url(worksheet, ":append?valueInputOption=USER_ENTERED");
        let resp = self
            .send(self.http.post(url).json(&json!({ "values": values })))
            .await?;
        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(SheetError::MissingWorksheet(worksheet.to_string()));
        }
        if !status.is_success() {
            return Err(status_error(status));
        }
        Ok(())
    }

    /// Clear all values in a worksheet (the tab itself survives).
    pub async fn clear_values(&self, worksheet: &str) -> Result<(), SheetError> {
        let resp = self
            .send(self.http.post(self.values_url(worksheet, ":clear")))
            .await?;
        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(SheetError::MissingWorksheet(worksheet.to_string()));
        }
        if !status.is_success() {
            return Err(status_error(status));
        }
        Ok(())
    }

    /// Overwrite a worksheet's values starting at A1.
    pub async fn update_values(
        &self,
        worksheet: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError> {
        let url = self.values_url(worksheet, "?valueInputOption=USER_ENTERED");
        let resp = self
            .send(self.http.put(url).json(&json!({ "values": values })))
            .await?;
        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(SheetError::MissingWorksheet(worksheet.to_string()));
        }
        if !status.is_success() {
            return Err(status_error(status));
        }
        Ok(())
    }

    /// Titles of all worksheet tabs in the spreadsheet.
    pub async fn worksheet_titles(&self) -> Result<Vec<String>, SheetError> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties.title",
            self.base, self.spreadsheet_id
        );
        let resp = self.send(self.http.get(url)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SheetError::BadResponse(e.to_string()))?;
        let titles = body
            .get("sheets")
            .and_then(Value::as_array)
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|s| {
                        s.pointer("/properties/title")
                            .and_then(Value::as_str)
                            .map(|t| t.to_string())
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(titles)
    }

    /// Create a new worksheet tab.
    pub async fn add_worksheet(&self, title: &str) -> Result<(), SheetError> {
        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.base, self.spreadsheet_id
        );
        let body = json!({
            "requests": [
                { "addSheet": { "properties": { "title": title } } }
            ]
        });
        let resp = self.send(self.http.post(url).json(&body)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        info!(worksheet = %title, "created worksheet");
        Ok(())
    }
}

/// Extract the value grid from a values API response body. Cells arrive as
/// strings in formatted-value mode, but numbers and bools are tolerated.
fn values_from_body(body: &Value) -> Vec<Vec<String>> {
    body.get("values")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_to_string).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Connectivity test
// ---------------------------------------------------------------------------

/// Result of a connectivity test.
#[derive(serde::Serialize)]
pub struct ConnectivityResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Test the stored connection with a lightweight metadata fetch.
pub async fn test_connectivity(base_url: &str, spreadsheet_id: &str, token: &str) -> ConnectivityResult {
    let base = {
        let normalized = normalize_base_url(base_url);
        if normalized.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            normalized
        }
    };
    let url = format!("{base}/v4/spreadsheets/{spreadsheet_id}?fields=spreadsheetId");

    let client = match Client::builder().timeout(CONNECTIVITY_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => {
            return ConnectivityResult {
                success: false,
                latency_ms: None,
                error: Some(format!("Failed to create HTTP client: {e}")),
            };
        }
    };

    let start = Instant::now();

    let resp = match client.get(&url).bearer_auth(token).send().await {
        Ok(r) => r,
        Err(e) => {
            return ConnectivityResult {
                success: false,
                latency_ms: None,
                error: Some(friendly_error(&base, &e).to_string()),
            };
        }
    };

    let latency = start.elapsed().as_millis() as u64;
    let status = resp.status();

    if status.is_success() {
        info!(latency_ms = latency, "spreadsheet connectivity test passed");
        ConnectivityResult {
            success: true,
            latency_ms: Some(latency),
            error: None,
        }
    } else {
        ConnectivityResult {
            success: false,
            latency_ms: Some(latency),
            error: Some(status_error(status).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("sheets.googleapis.com"),
            "https://sheets.googleapis.com"
        );
        assert_eq!(
            normalize_base_url("https://sheets.example.com/v4/"),
            "https://sheets.example.com"
        );
        assert_eq!(normalize_base_url("localhost:8090"), "http://localhost:8090");
        assert_eq!(normalize_base_url("  "), "");
    }

    #[test]
    fn test_connection_string_raw_json() {
        let raw = r#"{ "sid": "abc123", "key": "tok-1", "url": "sheets.example.com" }"#;
        assert_eq!(
            extract_spreadsheet_id_from_connection_string(raw).as_deref(),
            Some("abc123")
        );
        assert_eq!(extract_token_from_connection_string(raw).as_deref(), Some("tok-1"));
        assert_eq!(
            extract_base_url_from_connection_string(raw).as_deref(),
            Some("https://sheets.example.com")
        );
    }

    #[test]
    fn test_connection_string_base64url() {
        let payload = r#"{"sid":"sheet-9","key":"secret-token","url":"https://sheets.example.com"}"#;
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload);
        assert_eq!(
            extract_spreadsheet_id_from_connection_string(&encoded).as_deref(),
            Some("sheet-9")
        );
        assert_eq!(
            extract_token_from_connection_string(&encoded).as_deref(),
            Some("secret-token")
        );
    }

    #[test]
    fn test_connection_string_garbage() {
        assert_eq!(extract_spreadsheet_id_from_connection_string("short"), None);
        assert_eq!(extract_token_from_connection_string(""), None);
    }

    #[test]
    fn test_values_from_body_mixed_cells() {
        let body = serde_json::json!({
            "values": [["Date", "Qty"], ["05-01-2026", 3], ["06-01-2026", true]]
        });
        let values = values_from_body(&body);
        assert_eq!(values[1], vec!["05-01-2026".to_string(), "3".to_string()]);
        assert_eq!(values[2][1], "true");
    }
}
