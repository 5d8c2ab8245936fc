use crate::error::{Error, Result};
use crate::models::Observation;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use super::SeriesSource;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

pub struct FredFetcher {
    api_key: String,
    client: Client,
}

impl FredFetcher {
    pub fn new(api_key: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("MacroDatabase/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, client }
    }

    fn fetch_error(series_id: &str, reason: impl ToString) -> Error {
        Error::Fetch {
            series_id: series_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Parses the FRED observations payload. Entries with the "." placeholder
    /// (missing data) or an unparseable value are skipped.
    fn parse_observations(series_id: &str, json: &Value) -> Result<Vec<Observation>> {
        let observations = json["observations"]
            .as_array()
            .ok_or_else(|| Self::fetch_error(series_id, "no observations in response"))?;

        let mut series = Vec::new();

        for obs in observations {
            if let (Some(date_str), Some(value_str)) = (obs["date"].as_str(), obs["value"].as_str())
            {
                if value_str == "." {
                    continue;
                }

                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                    .map_err(|e| Self::fetch_error(series_id, format!("bad date: {}", e)))?;

                if let Ok(value) = value_str.parse::<f64>() {
                    if value.is_finite() {
                        series.push(Observation::new(date, value));
                    }
                }
            }
        }

        Ok(series)
    }
}

#[async_trait]
impl SeriesSource for FredFetcher {
    fn name(&self) -> &str {
        "FRED"
    }

    async fn fetch_series(
        &self,
        series_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(Self::fetch_error(series_id, "FRED API key is missing"));
        }

        let mut url = format!(
            "{}?series_id={}&api_key={}&file_type=json",
            BASE_URL, series_id, api_key
        );
        if let Some(start) = start_date {
            url.push_str(&format!("&observation_start={}", start.format("%Y-%m-%d")));
        }
        if let Some(end) = end_date {
            url.push_str(&format!("&observation_end={}", end.format("%Y-%m-%d")));
        }

        info!("fetching FRED series: {}", series_id);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::fetch_error(series_id, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("FRED returned {} for {}", status, series_id);
            return Err(Self::fetch_error(
                series_id,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| Self::fetch_error(series_id, e))?;

        let series = Self::parse_observations(series_id, &json)?;
        info!("fetched {} observations for {}", series.len(), series_id);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "123.45" },
                { "date": "2023-01-02", "value": "124.56" }
            ]
        });

        let series = FredFetcher::parse_observations("TEST", &json_data).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 123.45);
        assert_eq!(series[1].value, 124.56);
    }

    #[test]
    fn test_parse_missing_value() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "." },
                { "date": "2023-01-02", "value": "100.0" }
            ]
        });

        let series = FredFetcher::parse_observations("TEST", &json_data).unwrap();
        assert_eq!(series.len(), 1); // "." should be skipped
        assert_eq!(series[0].value, 100.0);
    }

    #[test]
    fn test_parse_invalid_format() {
        let json_data = json!({ "error": "bad request" });
        let result = FredFetcher::parse_observations("TEST", &json_data);
        assert!(matches!(result, Err(Error::Fetch { .. })));
    }
}
