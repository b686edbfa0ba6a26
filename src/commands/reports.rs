//! Revenue reporting commands.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::orders::OrderSource;
use crate::reports::Granularity;
use crate::{commands, dates, reports, tables, SheetsState};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RevenueReportPayload {
    #[serde(default, alias = "group_by", alias = "bucket")]
    granularity: String,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default, alias = "from_date", alias = "startDate")]
    from: Option<String>,
    #[serde(default, alias = "to_date", alias = "endDate")]
    to: Option<String>,
}

/// Order tables to aggregate. An empty selection means both.
fn parse_sources(raw: &[String]) -> Result<Vec<OrderSource>, String> {
    if raw.is_empty() {
        return Ok(vec![OrderSource::Motorbike, OrderSource::Car]);
    }
    let mut sources = Vec::new();
    for name in raw {
        let source = OrderSource::parse(name)?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    Ok(sources)
}

/// Revenue across the selected order tables, bucketed by day, week, or
/// month. Buckets are labelled by their first day in canonical form.
#[tauri::command]
pub async fn report_revenue(
    arg0: Option<Value>,
    state: tauri::State<'_, SheetsState>,
) -> Result<Value, String> {
    let payload: RevenueReportPayload = serde_json::from_value(arg0.unwrap_or_else(|| json!({})))
        .map_err(|e| format!("Invalid revenue report payload: {e}"))?;
    let granularity = Granularity::parse(&payload.granularity)?;
    let selected = parse_sources(&payload.sources)?;
    let from = payload.from.as_deref().and_then(dates::parse_flexible);
    let to = payload.to.as_deref().and_then(dates::parse_flexible);

    let client = commands::client(&state)?;
    let mut order_tables = Vec::with_capacity(selected.len());
    for source in &selected {
        let table = tables::read_table(&client, source.spec())
            .await
            .map_err(|e| e.to_string())?;
        order_tables.push((*source, table));
    }

    let buckets = reports::revenue_buckets(&order_tables, granularity, from, to);
    let total: f64 = buckets.iter().map(|(_, revenue)| revenue).sum();

    let rows: Vec<Value> = buckets
        .into_iter()
        .map(|(start, revenue)| {
            json!({
                "bucket": dates::format_date(start),
                "revenue": revenue,
            })
        })
        .collect();

    let sources: Vec<&str> = selected.iter().map(|s| s.name()).collect();
    Ok(json!({ "sources": sources, "rows": rows, "total": total }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_sources_defaults_to_both() {
        assert_eq!(
            parse_sources(&[]).unwrap(),
            vec![OrderSource::Motorbike, OrderSource::Car]
        );
    }

    #[test]
    fn test_parse_sources_respects_selection() {
        let only_moto = parse_sources(&["motorbike".to_string()]).unwrap();
        assert_eq!(only_moto, vec![OrderSource::Motorbike]);

        let deduped =
            parse_sources(&["car".to_string(), "car".to_string(), "motorbike".to_string()])
                .unwrap();
        assert_eq!(deduped, vec![OrderSource::Car, OrderSource::Motorbike]);

        assert!(parse_sources(&["bicycle".to_string()]).is_err());
    }

    #[test]
    fn test_buckets_labelled_by_first_day() {
        let mid_month = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
        let month_start = Granularity::Month.bucket_start(mid_month);
        assert_eq!(dates::format_date(month_start), "01-01-2026");

        let week_start = Granularity::Week.bucket_start(mid_month);
        assert_eq!(dates::format_date(week_start), "12-01-2026");
    }
}
