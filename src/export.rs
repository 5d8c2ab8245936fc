//! Read-side exports consumed by the chart and research-note tooling:
//! a wide-format pivot (one column per indicator, keyed by date) rendered
//! as CSV, and a structured JSON report with per-series statistics.

use crate::analysis::statistics;
use crate::error::Result;
use crate::models::Observation;
use crate::store::IndicatorStore;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Long-format storage pivoted to one column per indicator. Cells are None
/// where a series has no observation for that date.
#[derive(Debug, Clone)]
pub struct WideTable {
    pub columns: Vec<String>,
    pub rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

impl WideTable {
    pub fn to_csv(&self) -> String {
        let mut out = String::from("date");
        for column in &self.columns {
            out.push(',');
            out.push_str(column);
        }
        out.push('\n');

        for (date, values) in &self.rows {
            out.push_str(&date.format("%Y-%m-%d").to_string());
            for value in values {
                out.push(',');
                if let Some(v) = value {
                    out.push_str(&v.to_string());
                }
            }
            out.push('\n');
        }

        out
    }
}

/// Pivot of the selected indicators (all known indicators when `names` is
/// None), keyed by the union of their dates.
pub async fn wide_table(store: &IndicatorStore, names: Option<&[String]>) -> Result<WideTable> {
    let columns = match names {
        Some(names) => names.to_vec(),
        None => store.list_indicator_names().await?,
    };

    let mut series_by_column = Vec::with_capacity(columns.len());
    let mut all_dates: std::collections::BTreeSet<NaiveDate> = Default::default();

    for column in &columns {
        let series = store.query(column, None, None).await?;
        let map: BTreeMap<NaiveDate, f64> =
            series.iter().map(|obs| (obs.date, obs.value)).collect();
        all_dates.extend(map.keys().copied());
        series_by_column.push(map);
    }

    let rows = all_dates
        .into_iter()
        .map(|date| {
            let values = series_by_column
                .iter()
                .map(|map| map.get(&date).copied())
                .collect();
            (date, values)
        })
        .collect();

    Ok(WideTable { columns, rows })
}

/// Structured JSON snapshot of the database: per-indicator provenance,
/// summary statistics, the most recent observations, and each series'
/// correlation against the copper/gold ratio when it is present.
pub async fn json_report(store: &IndicatorStore, recent_window: usize) -> Result<Value> {
    let names = store.list_indicator_names().await?;

    let ratio_series = store.query("copper_gold_ratio", None, None).await?;

    let mut indicators = serde_json::Map::new();
    let mut current_values = serde_json::Map::new();
    let mut correlations = serde_json::Map::new();

    for name in &names {
        let series = store.query(name, None, None).await?;
        let Some(summary) = statistics::summarize(&series) else {
            continue;
        };
        let meta = store.metadata(name).await?;

        let first = series.first().map(|obs| obs.date);
        let last = series.last().map(|obs| obs.date);
        let latest = series.last().copied();

        let recent: Vec<Value> = series
            .iter()
            .rev()
            .take(recent_window)
            .rev()
            .map(observation_json)
            .collect();

        indicators.insert(
            name.clone(),
            json!({
                "description": meta.as_ref().and_then(|m| m.description.clone()),
                "source": meta.as_ref().and_then(|m| m.source.clone()),
                "series_id": meta.as_ref().and_then(|m| m.external_series_id.clone()),
                "records": summary.records,
                "date_range": {
                    "start": first.map(|d| d.format("%Y-%m-%d").to_string()),
                    "end": last.map(|d| d.format("%Y-%m-%d").to_string()),
                },
                "statistics": {
                    "mean": summary.mean,
                    "min": summary.min,
                    "max": summary.max,
                    "std": summary.std,
                },
                "recent_data": recent,
            }),
        );

        if let Some(latest) = latest {
            current_values.insert(name.clone(), observation_json(&latest));
        }

        if name != "copper_gold_ratio" && !ratio_series.is_empty() {
            let (corr, overlap) = statistics::pearson_correlation(&series, &ratio_series);
            if let Some(corr) = corr {
                correlations.insert(
                    name.clone(),
                    json!({
                        "vs": "copper_gold_ratio",
                        "correlation": corr,
                        "overlap": overlap,
                    }),
                );
            }
        }
    }

    Ok(json!({
        "last_updated": Utc::now().to_rfc3339(),
        "metadata": {
            "total_indicators": names.len(),
            "description": "Macro economic indicators database for copper/gold ratio analysis",
        },
        "current_values": Value::Object(current_values),
        "indicators": Value::Object(indicators),
        "correlations": Value::Object(correlations),
    }))
}

fn observation_json(obs: &Observation) -> Value {
    json!({
        "date": obs.date.format("%Y-%m-%d").to_string(),
        "value": obs.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rendering_with_gaps() {
        let table = WideTable {
            columns: vec!["copper".into(), "gold".into()],
            rows: vec![
                ("2023-01-01".parse().unwrap(), vec![Some(1.5), None]),
                ("2023-01-02".parse().unwrap(), vec![Some(2.0), Some(3.0)]),
            ],
        };

        let csv = table.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,copper,gold");
        assert_eq!(lines[1], "2023-01-01,1.5,");
        assert_eq!(lines[2], "2023-01-02,2,3");
    }
}
