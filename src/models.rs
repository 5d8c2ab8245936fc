use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One data point of an indicator. Dates are calendar dates with no
/// time-of-day; two observations of the same indicator never share a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Provenance record for a stored indicator. Exists iff at least one insert
/// has ever succeeded for that name; replaced wholesale on every insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IndicatorMeta {
    pub indicator_name: String,
    pub source: Option<String>,
    pub external_series_id: Option<String>,
    pub description: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Descriptive fields supplied alongside an insert.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    pub source: Option<String>,
    pub external_series_id: Option<String>,
    pub description: Option<String>,
}

impl Provenance {
    pub fn new(source: &str, external_series_id: Option<&str>, description: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            external_series_id: external_series_id.map(|s| s.to_string()),
            description: Some(description.to_string()),
        }
    }

    /// Provenance tag shared by all derived series.
    pub fn calculated(external_series_id: Option<&str>, description: &str) -> Self {
        Self::new("Calculated", external_series_id, description)
    }
}
