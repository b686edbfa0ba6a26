//! Monthly payroll and commission computation.
//!
//! Joins attendance totals and per-staff delivery revenue against the
//! PAY_RULES and COMMISSION_RULES worksheets. Joins match on free-text
//! employee and product names, exactly as the sheets are kept.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::dates;
use crate::orders::{self, OrderSource, COL_DATE, COL_PRODUCT, COL_QUANTITY};
use crate::table::Table;

/// Per-day rate applied when an employee has no PAY_RULES row.
pub const DEFAULT_DAILY_RATE: f64 = 250_000.0;

/// Commission rate applied when no rule matches any product a staff member
/// sold.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.02;

/// One employee's row of the PAY_RULES worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayRule {
    pub fixed_salary: f64,
    pub daily_rate: f64,
    pub allowance: f64,
    pub advance: f64,
    pub deduction: f64,
}

/// One product's row of the COMMISSION_RULES worksheet. A positive per-unit
/// amount takes precedence over a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionRule {
    pub product: String,
    pub per_unit: f64,
    pub percent: f64,
}

/// Quantity and revenue a staff member moved, per product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffSales {
    pub by_product: BTreeMap<String, (f64, f64)>,
    pub total_revenue: f64,
}

/// Computed pay line for one employee and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRow {
    pub month: String,
    pub employee: String,
    pub days: f64,
    pub revenue: f64,
    pub base_pay: f64,
    pub commission: f64,
    pub allowance: f64,
    pub advance: f64,
    pub deduction: f64,
    pub total_pay: f64,
}

impl PayrollRow {
    /// On-sheet rendering, column order matching the PAYROLL schema.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.month.clone(),
            self.employee.clone(),
            format_days(self.days),
            format_money(self.revenue),
            format_money(self.base_pay),
            format_money(self.commission),
            format_money(self.allowance),
            format_money(self.advance),
            format_money(self.deduction),
            format_money(self.total_pay),
        ]
    }
}

fn format_money(amount: f64) -> String {
    format!("{}", amount.round() as i64)
}

fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{}", days as i64)
    } else {
        format!("{days}")
    }
}

// ---------------------------------------------------------------------------
// Rule table parsing
// ---------------------------------------------------------------------------

/// Parse PAY_RULES into a per-employee map.
pub fn pay_rules_from(table: &Table) -> BTreeMap<String, PayRule> {
    let mut rules = BTreeMap::new();
    for idx in 0..table.rows.len() {
        let employee = table.cell(idx, "Employee").trim();
        if employee.is_empty() {
            continue;
        }
        rules.insert(
            employee.to_string(),
            PayRule {
                fixed_salary: table.number(idx, "Fixed salary"),
                daily_rate: table.number(idx, "Daily rate"),
                allowance: table.number(idx, "Allowance"),
                advance: table.number(idx, "Advance"),
                deduction: table.number(idx, "Deduction"),
            },
        );
    }
    rules
}

/// Parse COMMISSION_RULES, skipping rows without a product name.
pub fn commission_rules_from(table: &Table) -> Vec<CommissionRule> {
    (0..table.rows.len())
        .filter_map(|idx| {
            let product = table.cell(idx, "Product").trim();
            if product.is_empty() {
                return None;
            }
            Some(CommissionRule {
                product: product.to_string(),
                per_unit: table.number(idx, "Per unit"),
                percent: table.number(idx, "Percent"),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sales attribution
// ---------------------------------------------------------------------------

/// Attribute a month's order rows to their shippers. Motorbike rows credit
/// their single shipper fully; car rows split revenue and quantity evenly
/// across the non-blank shippers.
pub fn staff_sales_for_month(
    order_tables: &[(OrderSource, &Table)],
    month_key: &str,
) -> BTreeMap<String, StaffSales> {
    let mut sales: BTreeMap<String, StaffSales> = BTreeMap::new();
    for (source, table) in order_tables {
        for idx in 0..table.rows.len() {
            let Some(date) = dates::parse_flexible(table.cell(idx, COL_DATE)) else {
                continue;
            };
            if dates::month_key(date) != month_key {
                continue;
            }
            let revenue = orders::row_revenue(*source, table, idx);
            let quantity = table.number(idx, COL_QUANTITY);
            let product = table.cell(idx, COL_PRODUCT).trim().to_string();
            for (shipper, share) in orders::row_shipper_shares(*source, table, idx) {
                let entry = sales.entry(shipper).or_default();
                entry.total_revenue += revenue * share;
                if !product.is_empty() {
                    let (qty, rev) = entry.by_product.entry(product.clone()).or_insert((0.0, 0.0));
                    *qty += quantity * share;
                    *rev += revenue * share;
                }
            }
        }
    }
    sales
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Commission for one staff member: per matched product, quantity × per-unit
/// when the rule sets one, else product revenue × percent. When no rule
/// matches any sold product, 2 % of the member's total revenue.
pub fn commission_for(sales: &StaffSales, rules: &[CommissionRule]) -> f64 {
    let mut matched = false;
    let mut commission = 0.0;
    for (product, (quantity, revenue)) in &sales.by_product {
        let Some(rule) = rules.iter().find(|r| &r.product == product) else {
            continue;
        };
        matched = true;
        if rule.per_unit > 0.0 {
            commission += quantity * rule.per_unit;
        } else if rule.percent > 0.0 {
            commission += revenue * (rule.percent / 100.0);
        }
    }
    if matched {
        commission
    } else {
        sales.total_revenue * DEFAULT_COMMISSION_RATE
    }
}

/// Compute the monthly pay table. Every employee appearing in attendance,
/// sales, or PAY_RULES gets a row.
pub fn compute(
    month_key: &str,
    attendance_totals: &BTreeMap<String, f64>,
    sales: &BTreeMap<String, StaffSales>,
    pay_rules: &BTreeMap<String, PayRule>,
    commission_rules: &[CommissionRule],
) -> Vec<PayrollRow> {
    let employees: BTreeSet<&String> = attendance_totals
        .keys()
        .chain(sales.keys())
        .chain(pay_rules.keys())
        .collect();

    let empty_sales = StaffSales::default();

    employees
        .into_iter()
        .map(|employee| {
            let days = attendance_totals.get(employee).copied().unwrap_or(0.0);
            let staff_sales = sales.get(employee).unwrap_or(&empty_sales);
            let rule = pay_rules.get(employee).cloned().unwrap_or(PayRule {
                daily_rate: DEFAULT_DAILY_RATE,
                ..PayRule::default()
            });

            let base_pay = if rule.fixed_salary > 0.0 {
                rule.fixed_salary
            } else {
                let rate = if rule.daily_rate > 0.0 {
                    rule.daily_rate
                } else {
                    DEFAULT_DAILY_RATE
                };
                days * rate
            };
            let commission = commission_for(staff_sales, commission_rules);
            let total =
                base_pay + rule.allowance + commission - rule.advance - rule.deduction;

            PayrollRow {
                month: month_key.to_string(),
                employee: employee.clone(),
                days,
                revenue: staff_sales.total_revenue.round(),
                base_pay: base_pay.round(),
                commission: commission.round(),
                allowance: rule.allowance.round(),
                advance: rule.advance.round(),
                deduction: rule.deduction.round(),
                total_pay: total.round(),
            }
        })
        .collect()
}

/// Render computed rows as a PAYROLL-shaped table for persistence.
pub fn to_table(rows: &[PayrollRow]) -> Table {
    let mut table = Table::new(crate::tables::PAYROLL.headers);
    for row in rows {
        table.push_row(row.to_row());
    }
    table
}

/// Replace one month's rows in an existing PAYROLL table, leaving other
/// months untouched (the month analogue of upsert-by-date).
pub fn merge_month(existing: &Table, month_key: &str, rows: &[PayrollRow]) -> Table {
    let mut merged = Table::new(crate::tables::PAYROLL.headers);
    for idx in 0..existing.rows.len() {
        if existing.cell(idx, "Month").trim() == month_key {
            continue;
        }
        let row: Vec<String> = crate::tables::PAYROLL
            .headers
            .iter()
            .map(|h| existing.cell(idx, h).to_string())
            .collect();
        merged.push_row(row);
    }
    for row in rows {
        merged.push_row(row.to_row());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_of(entries: &[(&str, f64, f64)]) -> StaffSales {
        // (product, qty, revenue)
        let mut sales = StaffSales::default();
        for (product, qty, revenue) in entries {
            sales.by_product.insert(product.to_string(), (*qty, *revenue));
            sales.total_revenue += revenue;
        }
        sales
    }

    #[test]
    fn test_commission_defaults_to_two_percent_without_matching_rule() {
        let sales = sales_of(&[("Aqua 500", 10.0, 120_000.0)]);
        let rules = vec![CommissionRule {
            product: "Ocany 350".into(),
            per_unit: 500.0,
            percent: 0.0,
        }];
        assert_eq!(commission_for(&sales, &rules), 120_000.0 * 0.02);
        // No rules at all behaves the same.
        assert_eq!(commission_for(&sales, &[]), 2_400.0);
    }

    #[test]
    fn test_commission_per_unit_beats_percent() {
        let sales = sales_of(&[("Aqua 500", 10.0, 120_000.0)]);
        let rules = vec![CommissionRule {
            product: "Aqua 500".into(),
            per_unit: 1_000.0,
            percent: 5.0,
        }];
        assert_eq!(commission_for(&sales, &rules), 10_000.0);
    }

    #[test]
    fn test_commission_percent_rule_and_unmatched_products_pay_nothing() {
        let sales = sales_of(&[
            ("Aqua 500", 10.0, 120_000.0),
            ("Aqua 5l", 2.0, 60_000.0),
        ]);
        let rules = vec![CommissionRule {
            product: "Aqua 500".into(),
            per_unit: 0.0,
            percent: 5.0,
        }];
        // Once any rule matches, unmatched products earn nothing extra.
        assert_eq!(commission_for(&sales, &rules), 6_000.0);
    }

    #[test]
    fn test_base_pay_fixed_salary_overrides_daily_rate() {
        let mut pay_rules = BTreeMap::new();
        pay_rules.insert(
            "Phap".to_string(),
            PayRule {
                fixed_salary: 8_000_000.0,
                daily_rate: 300_000.0,
                allowance: 500_000.0,
                advance: 1_000_000.0,
                deduction: 200_000.0,
            },
        );
        let mut attendance = BTreeMap::new();
        attendance.insert("Phap".to_string(), 26.0);

        let rows = compute("01/2026", &attendance, &BTreeMap::new(), &pay_rules, &[]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.base_pay, 8_000_000.0);
        // commission 0 (no sales), total = 8m + 0.5m + 0 - 1m - 0.2m
        assert_eq!(row.total_pay, 7_300_000.0);
    }

    #[test]
    fn test_base_pay_daily_rate_and_defaults() {
        let mut attendance = BTreeMap::new();
        attendance.insert("Minh".to_string(), 10.5);

        // No PAY_RULES row: default daily rate applies.
        let rows = compute("01/2026", &attendance, &BTreeMap::new(), &BTreeMap::new(), &[]);
        assert_eq!(rows[0].base_pay, (10.5 * DEFAULT_DAILY_RATE).round());
        assert_eq!(rows[0].total_pay, rows[0].base_pay);
    }

    #[test]
    fn test_compute_includes_sales_only_employees() {
        let mut sales = BTreeMap::new();
        sales.insert("Tam".to_string(), sales_of(&[("Aqua 500", 5.0, 100_000.0)]));

        let rows = compute("01/2026", &BTreeMap::new(), &sales, &BTreeMap::new(), &[]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.employee, "Tam");
        assert_eq!(row.days, 0.0);
        assert_eq!(row.base_pay, 0.0);
        assert_eq!(row.commission, 2_000.0);
        assert_eq!(row.total_pay, 2_000.0);
    }

    #[test]
    fn test_staff_sales_split_car_revenue_between_shippers() {
        let mut car = Table::new(&[
            "Date", "Customer", "Product", "Container", "Quantity", "Unit price", "Paid",
            "Payment method", "Note", "Shipper 1", "Shipper 2",
        ]);
        car.push_row(vec![
            "05-01-2026".into(), "C".into(), "Aqua 500".into(), "bottle".into(), "4".into(),
            "10000".into(), "0".into(), "cash".into(), "".into(), "Phap".into(), "Minh".into(),
        ]);
        let sales = staff_sales_for_month(&[(OrderSource::Car, &car)], "01/2026");
        assert_eq!(sales["Phap"].total_revenue, 20_000.0);
        assert_eq!(sales["Minh"].total_revenue, 20_000.0);
        assert_eq!(sales["Phap"].by_product["Aqua 500"], (2.0, 20_000.0));
    }

    #[test]
    fn test_staff_sales_filters_by_month() {
        let mut moto = Table::new(&[
            "Date", "Customer", "Code", "Street", "Product", "Container", "Quantity",
            "Empties returned", "Paid", "Payment method", "Note", "Shipper",
        ]);
        for (date, paid) in [("05-01-2026", "10000"), ("05-02-2026", "99000")] {
            moto.push_row(vec![
                date.into(), "C".into(), "".into(), "".into(), "Aqua 500".into(),
                "bottle".into(), "1".into(), "".into(), paid.into(), "cash".into(),
                "".into(), "Phap".into(),
            ]);
        }
        let sales = staff_sales_for_month(&[(OrderSource::Motorbike, &moto)], "01/2026");
        assert_eq!(sales["Phap"].total_revenue, 10_000.0);
    }

    #[test]
    fn test_merge_month_replaces_only_target_month() {
        let mut existing = Table::new(crate::tables::PAYROLL.headers);
        existing.push_row(vec![
            "12/2025".into(), "Phap".into(), "26".into(), "0".into(), "6500000".into(),
            "0".into(), "0".into(), "0".into(), "0".into(), "6500000".into(),
        ]);
        existing.push_row(vec![
            "01/2026".into(), "Phap".into(), "10".into(), "0".into(), "2500000".into(),
            "0".into(), "0".into(), "0".into(), "0".into(), "2500000".into(),
        ]);

        let fresh = vec![PayrollRow {
            month: "01/2026".into(),
            employee: "Phap".into(),
            days: 12.0,
            revenue: 0.0,
            base_pay: 3_000_000.0,
            commission: 0.0,
            allowance: 0.0,
            advance: 0.0,
            deduction: 0.0,
            total_pay: 3_000_000.0,
        }];

        let merged = merge_month(&existing, "01/2026", &fresh);
        assert_eq!(merged.rows.len(), 2);
        assert_eq!(merged.rows[0][0], "12/2025");
        assert_eq!(merged.rows[1][2], "12");
        assert_eq!(merged.rows[1][4], "3000000");
    }
}
