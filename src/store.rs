use crate::error::{Error, Result};
use crate::models::{IndicatorMeta, Observation, Provenance};
use crate::timeseries;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Keyed storage of named time series. Wraps a SQLite pool; callers pass the
/// store handle explicitly rather than holding it in process-global state.
#[derive(Clone)]
pub struct IndicatorStore {
    pool: SqlitePool,
}

impl IndicatorStore {
    /// Opens (creating if necessary) the database file and its schema.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let database_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        info!("connecting to SQLite database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    /// In-memory store, used by the test suite. A single connection keeps
    /// every operation on the same in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS observations (
                date TEXT NOT NULL,
                indicator_name TEXT NOT NULL,
                value REAL NOT NULL,
                PRIMARY KEY (date, indicator_name)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS indicator_metadata (
                indicator_name TEXT PRIMARY KEY,
                source TEXT,
                external_series_id TEXT,
                description TEXT,
                last_updated TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces the whole series stored under `name`.
    ///
    /// This is a full replace, not an incremental merge: all prior
    /// observations for the name are discarded and the metadata record is
    /// rewritten, inside one transaction. Callers must always supply the
    /// complete desired series. Duplicate dates in the input collapse to the
    /// later entry. Returns the number of observations written.
    pub async fn insert(
        &self,
        name: &str,
        series: &[Observation],
        provenance: &Provenance,
    ) -> Result<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        // NaN or infinity must never reach a stored row.
        for obs in series {
            if !obs.value.is_finite() {
                return Err(Error::NonFinite {
                    name: name.to_string(),
                    date: obs.date,
                });
            }
        }

        let deduped = timeseries::normalize(series);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM observations WHERE indicator_name = $1")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        for (date, value) in &deduped {
            sqlx::query(
                "INSERT INTO observations (date, indicator_name, value) VALUES ($1, $2, $3)",
            )
            .bind(date)
            .bind(name)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT OR REPLACE INTO indicator_metadata
             (indicator_name, source, external_series_id, description, last_updated)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(name)
        .bind(&provenance.source)
        .bind(&provenance.external_series_id)
        .bind(&provenance.description)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("stored {} observations for '{}'", deduped.len(), name);
        Ok(deduped.len())
    }

    /// Returns the stored series ascending by date, optionally filtered to
    /// the inclusive `[start, end]` range. A name that was never inserted
    /// yields an empty vec, not an error; check `metadata` to tell the two
    /// apart.
    pub async fn query(
        &self,
        name: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let mut sql =
            String::from("SELECT date, value FROM observations WHERE indicator_name = $1");
        if start_date.is_some() {
            sql.push_str(" AND date >= $2");
        }
        if end_date.is_some() {
            sql.push_str(if start_date.is_some() {
                " AND date <= $3"
            } else {
                " AND date <= $2"
            });
        }
        sql.push_str(" ORDER BY date ASC");

        let mut query = sqlx::query_as::<_, Observation>(&sql).bind(name);
        if let Some(start) = start_date {
            query = query.bind(start);
        }
        if let Some(end) = end_date {
            query = query.bind(end);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Provenance record for `name`, or None if no insert ever succeeded.
    pub async fn metadata(&self, name: &str) -> Result<Option<IndicatorMeta>> {
        let meta = sqlx::query_as::<_, IndicatorMeta>(
            "SELECT indicator_name, source, external_series_id, description, last_updated
             FROM indicator_metadata
             WHERE indicator_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(meta)
    }

    /// All known indicator names, sorted.
    pub async fn list_indicator_names(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT indicator_name FROM indicator_metadata ORDER BY indicator_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
