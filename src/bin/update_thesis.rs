//! Batch refresh of the thesis database: fetch every registry series,
//! recompute the derived series, export CSV + JSON. One indicator failing
//! does not abort the run; failures are collected and reported at the end.

use anyhow::{Context, Result};
use macro_database::derive::{CompositeComponent, Sign};
use macro_database::fetcher::fred::FredFetcher;
use macro_database::fetcher::yahoo::YahooFetcher;
use macro_database::fetcher::SeriesSource;
use macro_database::registry::{Registry, SourceKind};
use macro_database::{analysis::statistics, export, IndicatorStore, Provenance};
use std::path::PathBuf;
use tracing::{error, info, warn};

// Observation counts approximating one calendar year, per series frequency.
const YOY_DAILY: usize = 252;
const YOY_MONTHLY: usize = 12;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let api_key = std::env::var("FRED_API_KEY").context(
        "FRED_API_KEY not set. Get a key from \
         https://fred.stlouisfed.org/docs/api/api_key.html and export it.",
    )?;

    let db_path =
        PathBuf::from(std::env::var("MACRO_DB_PATH").unwrap_or_else(|_| "macro_data.db".into()));
    let store = IndicatorStore::open(&db_path).await?;

    let fred = FredFetcher::new(api_key);
    let yahoo = YahooFetcher::new();

    // 1. Fetch every cataloged series, best-effort.
    let mut failures: Vec<String> = Vec::new();
    for def in Registry::all() {
        let source: &dyn SeriesSource = match def.source {
            SourceKind::Fred => &fred,
            SourceKind::Yahoo => &yahoo,
        };

        match source.fetch_series(def.external_id, None, None).await {
            Ok(series) => {
                let provenance =
                    Provenance::new(source.name(), Some(def.external_id), def.description);
                store.insert(def.name, &series, &provenance).await?;
                info!("updated '{}': {} observations", def.name, series.len());
            }
            Err(e) => {
                warn!("skipping '{}': {}", def.name, e);
                failures.push(def.name.to_string());
            }
        }
    }

    if failures.len() == Registry::all().len() {
        error!("every fetch failed; leaving stored data untouched");
        std::process::exit(1);
    }

    // 2. Recompute derived series. Derivation failures (missing inputs,
    // no overlap) are skipped like fetch failures.
    let derivations: Vec<(&str, macro_database::Result<_>)> = vec![
        (
            "copper_gold_ratio",
            store
                .derive_ratio("copper_price", "gold_price", "copper_gold_ratio")
                .await,
        ),
        (
            "bitcoin_yoy",
            store
                .derive_percent_change("bitcoin_price", YOY_DAILY, "bitcoin_yoy")
                .await,
        ),
        (
            "taiwan_exports_yoy",
            store
                .derive_percent_change("taiwan_exports", YOY_MONTHLY, "taiwan_exports_yoy")
                .await,
        ),
        (
            "audusd_yoy",
            store
                .derive_percent_change("audusd", YOY_DAILY, "audusd_yoy")
                .await,
        ),
        (
            "cadusd_yoy",
            store
                .derive_percent_change("cadusd", YOY_DAILY, "cadusd_yoy")
                .await,
        ),
    ];

    for (name, result) in derivations {
        match result {
            Ok(series) => info!("derived '{}': {} observations", name, series.len()),
            Err(e) => {
                warn!("skipping derived '{}': {}", name, e);
                failures.push(name.to_string());
            }
        }
    }

    // Growth composite across the commodity complex.
    let components = [
        CompositeComponent::new("copper_gold_ratio", 1.0, Sign::Positive),
        CompositeComponent::new("audusd_yoy", 1.0, Sign::Positive),
        CompositeComponent::new("cadusd_yoy", 1.0, Sign::Positive),
    ];
    match store.derive_composite(&components, "growth_composite").await {
        Ok(series) => info!("derived 'growth_composite': {} observations", series.len()),
        Err(e) => {
            warn!("skipping 'growth_composite': {}", e);
            failures.push("growth_composite".to_string());
        }
    }

    // 3. Exports.
    let table = export::wide_table(&store, None).await?;
    std::fs::write("macro_data_export.csv", table.to_csv())?;
    info!("exported wide CSV to macro_data_export.csv");

    let report = export::json_report(&store, 30).await?;
    std::fs::write("macro_data_api.json", serde_json::to_string_pretty(&report)?)?;
    info!("exported JSON report to macro_data_api.json");

    // 4. Ratio summary, the headline number of the research note.
    let ratio = store.query("copper_gold_ratio", None, None).await?;
    if let Some(summary) = statistics::summarize(&ratio) {
        println!("--- Copper/Gold Ratio ---");
        println!("records: {}", summary.records);
        if let (Some(first), Some(last)) = (ratio.first(), ratio.last()) {
            println!("range:   {} to {}", first.date, last.date);
        }
        println!("current: {:.4}", summary.latest);
        println!("mean:    {:.4}", summary.mean);
        println!("min:     {:.4}", summary.min);
        println!("max:     {:.4}", summary.max);
    }

    if failures.is_empty() {
        info!("update complete");
    } else {
        warn!("update complete with {} skipped: {}", failures.len(), failures.join(", "));
    }

    Ok(())
}
