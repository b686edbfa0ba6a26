//! Attendance / timesheet records.
//!
//! A full day counts 1.0 credit, a half day (morning or afternoon) 0.5.
//! Payroll joins the per-employee monthly totals computed here.

use std::collections::BTreeMap;

use crate::dates;
use crate::table::Table;

const COL_DATE: &str = "Date";
const COL_EMPLOYEE: &str = "Employee";
const COL_CREDIT: &str = "Credit";

/// Shift kinds accepted on attendance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    Full,
    Morning,
    Afternoon,
}

impl ShiftKind {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full" | "full_day" => Ok(Self::Full),
            "morning" | "half_morning" => Ok(Self::Morning),
            "afternoon" | "half_afternoon" => Ok(Self::Afternoon),
            other => Err(format!("Unknown shift kind: {other}")),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
        }
    }

    /// Day credit recorded with the row.
    pub fn credit(self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::Morning | Self::Afternoon => 0.5,
        }
    }
}

/// Rows of the attendance table falling in a `mm/yyyy` month, with the date
/// cell canonicalized. Unparseable dates are skipped.
pub fn rows_for_month(attendance: &Table, month_key: &str) -> Table {
    let header_refs: Vec<&str> = attendance.headers.iter().map(|h| h.as_str()).collect();
    let mut filtered = Table::new(&header_refs);
    let date_idx = attendance.col(COL_DATE);

    for idx in 0..attendance.rows.len() {
        let Some(date) = dates::parse_flexible(attendance.cell(idx, COL_DATE)) else {
            continue;
        };
        if dates::month_key(date) != month_key {
            continue;
        }
        let mut row = attendance.rows[idx].clone();
        if let Some(di) = date_idx {
            row[di] = dates::format_date(date);
        }
        filtered.push_row(row);
    }
    filtered
}

/// Per-employee credit totals for a `mm/yyyy` month.
pub fn month_totals(attendance: &Table, month_key: &str) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for idx in 0..attendance.rows.len() {
        let Some(date) = dates::parse_flexible(attendance.cell(idx, COL_DATE)) else {
            continue;
        };
        if dates::month_key(date) != month_key {
            continue;
        }
        let employee = attendance.cell(idx, COL_EMPLOYEE).trim();
        if employee.is_empty() {
            continue;
        }
        *totals.entry(employee.to_string()).or_insert(0.0) +=
            attendance.number(idx, COL_CREDIT);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendance(rows: &[(&str, &str, &str, &str)]) -> Table {
        let mut table = Table::new(&["Date", "Employee", "Shift", "Credit", "Note"]);
        for (date, employee, shift, credit) in rows {
            table.push_row(vec![
                date.to_string(), employee.to_string(), shift.to_string(),
                credit.to_string(), String::new(),
            ]);
        }
        table
    }

    #[test]
    fn test_shift_credits() {
        assert_eq!(ShiftKind::parse("full").unwrap().credit(), 1.0);
        assert_eq!(ShiftKind::parse("Morning").unwrap().credit(), 0.5);
        assert_eq!(ShiftKind::parse("afternoon").unwrap().credit(), 0.5);
        assert!(ShiftKind::parse("night").is_err());
    }

    #[test]
    fn test_month_totals_sum_per_employee() {
        let table = attendance(&[
            ("05-01-2026", "Phap", "full", "1"),
            ("06-01-2026", "Phap", "morning", "0.5"),
            ("06-01-2026", "Minh", "full", "1"),
            ("05-02-2026", "Phap", "full", "1"),
            ("bad-date", "Phap", "full", "1"),
        ]);
        let totals = month_totals(&table, "01/2026");
        assert_eq!(totals.get("Phap"), Some(&1.5));
        assert_eq!(totals.get("Minh"), Some(&1.0));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn test_rows_for_month_filters_and_canonicalizes() {
        let table = attendance(&[
            ("2026-01-05", "Phap", "full", "1"),
            ("05-02-2026", "Phap", "full", "1"),
        ]);
        let rows = rows_for_month(&table, "01/2026");
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(rows.rows[0][0], "05-01-2026");
    }
}
