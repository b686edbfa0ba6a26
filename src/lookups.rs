//! Lookup catalog: category → allowed values, feeding selection inputs.
//!
//! Backed by the `LOOKUPS` worksheet (Category, Value). Option lists are
//! deduplicated and sorted on every read; product/item pickers additionally
//! merge item names found in the `INVENTORY` worksheet.

use std::collections::BTreeSet;

use tracing::warn;

use crate::sheets::SheetsClient;
use crate::table::Table;
use crate::tables;

/// Known lookup categories. Free-form categories are accepted on write, the
/// frontend just offers these by default.
pub const CATEGORIES: &[&str] = &[
    "street",
    "product",
    "container",
    "payment_method",
    "shipper",
    "item",
];

const COL_CATEGORY: &str = "Category";
const COL_VALUE: &str = "Value";

/// Deduplicated, sorted, blank-filtered values for one category.
pub fn options_from(table: &Table, category: &str) -> Vec<String> {
    let mut values = BTreeSet::new();
    for idx in 0..table.rows.len() {
        if table.cell(idx, COL_CATEGORY).trim() != category {
            continue;
        }
        let value = table.cell(idx, COL_VALUE).trim();
        if !value.is_empty() {
            values.insert(value.to_string());
        }
    }
    values.into_iter().collect()
}

/// Whether the (category, value) pair is already recorded.
pub fn contains(table: &Table, category: &str, value: &str) -> bool {
    (0..table.rows.len()).any(|idx| {
        table.cell(idx, COL_CATEGORY).trim() == category
            && table.cell(idx, COL_VALUE).trim() == value
    })
}

/// Sorted distinct item names present in the `INVENTORY` worksheet.
pub fn items_from_inventory(inventory: &Table) -> Vec<String> {
    let mut items = BTreeSet::new();
    for idx in 0..inventory.rows.len() {
        let item = inventory.cell(idx, "Item").trim();
        if !item.is_empty() {
            items.insert(item.to_string());
        }
    }
    items.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Remote wrappers
// ---------------------------------------------------------------------------

/// Option list for a category; empty on any read failure (selection inputs
/// fall back to free text).
pub async fn options(client: &SheetsClient, category: &str) -> Vec<String> {
    match tables::read_table(client, tables::LOOKUPS).await {
        Ok(table) => options_from(&table, category),
        Err(e) => {
            warn!(category, error = %e, "failed to read LOOKUPS, returning no options");
            Vec::new()
        }
    }
}

/// Append a new allowed value unless it is blank or already present.
pub async fn add_value(client: &SheetsClient, category: &str, value: &str) -> Result<(), String> {
    let category = category.trim();
    let value = value.trim();
    if category.is_empty() || value.is_empty() {
        return Ok(());
    }
    let table = tables::read_table(client, tables::LOOKUPS)
        .await
        .map_err(|e| e.to_string())?;
    if contains(&table, category, value) {
        return Ok(());
    }
    tables::append_row(
        client,
        tables::LOOKUPS,
        vec![category.to_string(), value.to_string()],
    )
    .await
    .map_err(|e| e.to_string())
}

/// Item names for inventory pickers; empty on read failure.
pub async fn inventory_items(client: &SheetsClient) -> Vec<String> {
    match tables::read_table(client, tables::INVENTORY).await {
        Ok(table) => items_from_inventory(&table),
        Err(e) => {
            warn!(error = %e, "failed to read INVENTORY, returning no items");
            Vec::new()
        }
    }
}
