//! In-memory representation of a worksheet.
//!
//! A `Table` is a header row plus weakly-typed string cells, mirroring what
//! the spreadsheet values API returns. Numeric fields are coerced at the
//! point of use; malformed cells read as zero rather than failing the whole
//! view.

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with a known header row.
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from a raw value grid (first row = headers).
    ///
    /// Header cells are trimmed, all-blank rows are dropped, and short rows
    /// are padded so every row matches the header width.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();
        let headers: Vec<String> = iter
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        let width = headers.len();
        let rows = iter
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|mut row| {
                row.truncate(width);
                while row.len() < width {
                    row.push(String::new());
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Raw value grid including the header row, as sent to the values API.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.headers.clone());
        values.extend(self.rows.iter().cloned());
        values
    }

    /// Index of a column by (trimmed) header name.
    pub fn col(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text for a row and named column; empty string when either is
    /// missing.
    pub fn cell<'a>(&'a self, row: usize, name: &str) -> &'a str {
        self.col(name)
            .and_then(|idx| self.rows.get(row).and_then(|r| r.get(idx)))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Numeric value of a cell, coerced defensively.
    pub fn number(&self, row: usize, name: &str) -> f64 {
        parse_number(self.cell(row, name))
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        let mut row = row;
        row.truncate(self.headers.len());
        while row.len() < self.headers.len() {
            row.push(String::new());
        }
        self.rows.push(row);
    }

    /// Rows as JSON objects keyed by header, for the IPC boundary.
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (idx, header) in self.headers.iter().enumerate() {
                    let cell = row.get(idx).map(|s| s.as_str()).unwrap_or("");
                    obj.insert(header.clone(), Value::String(cell.to_string()));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

/// Coerce a cell to a number: trim, strip thousands separators, and fall
/// back to 0.0 on anything unparseable (free-text like "x" shows up in
/// numeric columns on real sheets).
pub fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_values_trims_headers_and_drops_blank_rows() {
        let table = Table::from_values(grid(&[
            &[" Date ", "Item", "Qty"],
            &["05-01-2026", "Aqua 500", "3"],
            &["", "  ", ""],
            &["06-01-2026", "Aqua 500"],
        ]));
        assert_eq!(table.headers, vec!["Date", "Item", "Qty"]);
        assert_eq!(table.rows.len(), 2);
        // Short row padded to header width.
        assert_eq!(table.rows[1], vec!["06-01-2026", "Aqua 500", ""]);
    }

    #[test]
    fn test_cell_and_number_access() {
        let table = Table::from_values(grid(&[
            &["Item", "Qty", "Paid"],
            &["Aqua 500", "3", "1,200,000"],
            &["Ocany 350", "x", ""],
        ]));
        assert_eq!(table.cell(0, "Item"), "Aqua 500");
        assert_eq!(table.number(0, "Paid"), 1_200_000.0);
        // Free text and blanks coerce to zero.
        assert_eq!(table.number(1, "Qty"), 0.0);
        assert_eq!(table.number(1, "Paid"), 0.0);
        // Unknown column reads as empty.
        assert_eq!(table.cell(0, "Nope"), "");
    }

    #[test]
    fn test_to_values_roundtrip() {
        let mut table = Table::new(&["Category", "Value"]);
        table.push_row(vec!["street".into(), "Main St".into()]);
        let rebuilt = Table::from_values(table.to_values());
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_parse_number_comma_separators() {
        assert_eq!(parse_number(" 250,000 "), 250_000.0);
        assert_eq!(parse_number("0"), 0.0);
        assert_eq!(parse_number("12.5"), 12.5);
        assert_eq!(parse_number("abc"), 0.0);
    }
}
