//! Lookup catalog commands.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::{commands, lookups, tables, SheetsState};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LookupCategoryPayload {
    #[serde(default, alias = "name")]
    category: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LookupAddPayload {
    #[serde(default, alias = "name")]
    category: String,
    #[serde(default)]
    value: String,
}

fn parse_category(arg0: Option<Value>) -> Result<String, String> {
    let category = match arg0 {
        Some(Value::String(s)) => s,
        Some(value) => {
            let parsed: LookupCategoryPayload = serde_json::from_value(value)
                .map_err(|e| format!("Invalid lookup payload: {e}"))?;
            parsed.category
        }
        None => String::new(),
    };
    let category = category.trim().to_string();
    if category.is_empty() {
        return Err("Missing lookup category".into());
    }
    Ok(category)
}

#[tauri::command]
pub fn lookup_get_categories() -> Result<Value, String> {
    Ok(json!({ "categories": lookups::CATEGORIES }))
}

/// Option list for one category. Product and item pickers also surface the
/// item names already present in the inventory sheet.
#[tauri::command]
pub async fn lookup_get_options(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let category = parse_category(arg0)?;
    let client = commands::client(&state)?;

    let mut options = lookups::options(&client, &category).await;
    if category == "product" || category == "item" {
        for item in lookups::inventory_items(&client).await {
            if !options.contains(&item) {
                options.push(item);
            }
        }
        options.sort();
    }

    Ok(json!({ "category": category, "options": options }))
}

#[tauri::command]
pub async fn lookup_add_value(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: LookupAddPayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid lookup payload: {e}"))?;
    let category = payload.category.trim().to_string();
    let value = payload.value.trim().to_string();
    if category.is_empty() || value.is_empty() {
        return Err("Missing lookup category or value".into());
    }

    let client = commands::client(&state)?;
    lookups::add_value(&client, &category, &value).await?;
    info!(category = %category, value = %value, "lookup value recorded");
    Ok(json!({ "success": true }))
}

/// The whole catalog keyed by category, known categories always present.
#[tauri::command]
pub async fn lookup_get_all(state: tauri::State<'_, SheetsState>) -> Result<Value, String> {
    let client = commands::client(&state)?;
    let table = tables::read_table(&client, tables::LOOKUPS)
        .await
        .map_err(|e| e.to_string())?;

    let mut categories: Vec<String> = lookups::CATEGORIES.iter().map(|c| c.to_string()).collect();
    for idx in 0..table.rows.len() {
        let category = table.cell(idx, "Category").trim().to_string();
        if !category.is_empty() && !categories.contains(&category) {
            categories.push(category);
        }
    }

    let mut out = Map::new();
    for category in categories {
        let options = lookups::options_from(&table, &category);
        out.insert(category, json!(options));
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_string_and_object() {
        assert_eq!(parse_category(Some(json!("street"))).unwrap(), "street");
        assert_eq!(
            parse_category(Some(json!({ "category": " shipper " }))).unwrap(),
            "shipper"
        );
        assert!(parse_category(None).is_err());
        assert!(parse_category(Some(json!({}))).is_err());
    }
}
