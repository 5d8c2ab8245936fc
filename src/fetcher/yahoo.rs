use crate::error::{Error, Result};
use crate::models::Observation;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::info;
use yahoo_finance_api as yahoo;

use super::SeriesSource;

/// Daily closes from Yahoo Finance, keyed by ticker (e.g. "BTC-USD", "^RUT").
pub struct YahooFetcher;

impl YahooFetcher {
    pub fn new() -> Self {
        YahooFetcher
    }

    fn fetch_error(series_id: &str, reason: impl ToString) -> Error {
        Error::Fetch {
            series_id: series_id.to_string(),
            reason: reason.to_string(),
        }
    }

    // The yahoo_finance_api crate speaks `time`, not `chrono`.
    fn to_offset(date: NaiveDate, end_of_day: bool) -> OffsetDateTime {
        let (h, m, s) = if end_of_day { (23, 59, 59) } else { (0, 0, 0) };
        let ts = date.and_hms_opt(h, m, s).unwrap().and_utc().timestamp();
        OffsetDateTime::from_unix_timestamp(ts).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Default for YahooFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesSource for YahooFetcher {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_series(
        &self,
        series_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| Self::fetch_error(series_id, format!("connector init: {}", e)))?;

        let now = OffsetDateTime::now_utc();
        let start = start_date
            .map(|d| Self::to_offset(d, false))
            .unwrap_or(now - time::Duration::days(365 * 10));
        let end = end_date.map(|d| Self::to_offset(d, true)).unwrap_or(now);

        info!("fetching Yahoo quotes: {}", series_id);

        let resp = provider
            .get_quote_history(series_id, start, end)
            .await
            .map_err(|e| Self::fetch_error(series_id, e))?;

        let quotes = resp
            .quotes()
            .map_err(|e| Self::fetch_error(series_id, format!("bad quote payload: {}", e)))?;

        // Intraday timestamps collapse to one close per calendar date;
        // the last quote of a day wins.
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for quote in quotes {
            if !quote.close.is_finite() {
                continue;
            }
            if let Some(ts) = Utc.timestamp_opt(quote.timestamp as i64, 0).single() {
                by_date.insert(ts.date_naive(), quote.close);
            }
        }

        if by_date.is_empty() {
            return Err(Self::fetch_error(series_id, "no quotes returned"));
        }

        info!("fetched {} daily closes for {}", by_date.len(), series_id);

        Ok(by_date
            .into_iter()
            .map(|(date, value)| Observation::new(date, value))
            .collect())
    }
}
