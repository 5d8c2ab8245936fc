use crate::error::Result;
use crate::models::Observation;
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod fred;
pub mod yahoo;

/// A provider of raw time series. Implementations return a clean series
/// (finite values only, one observation per date) or a fetch failure; they
/// never touch the store.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_series(
        &self,
        series_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Observation>>;
}
