//! Read-only listing of stored indicators with observation counts and date
//! ranges.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path =
        PathBuf::from(std::env::var("MACRO_DB_PATH").unwrap_or_else(|_| "macro_data.db".into()));

    println!("Connecting to: {:?}", db_path);

    if !db_path.exists() {
        println!("DB not found!");
        return Ok(());
    }

    let url = format!("sqlite://{}?mode=ro", db_path.to_string_lossy());
    let pool = SqlitePoolOptions::new().connect(&url).await?;

    let rows = sqlx::query(
        r#"
        SELECT
            m.indicator_name,
            m.source,
            COUNT(o.value) as total_rows,
            MIN(o.date) as first_date,
            MAX(o.date) as last_date
        FROM indicator_metadata m
        LEFT JOIN observations o ON m.indicator_name = o.indicator_name
        GROUP BY m.indicator_name, m.source
        ORDER BY m.source, m.indicator_name;
        "#,
    )
    .fetch_all(&pool)
    .await?;

    println!(
        "{:<30} | {:<15} | {:<8} | {:<12} | {:<12}",
        "Indicator", "Source", "Count", "Start", "End"
    );
    println!("{}", "-".repeat(90));

    for row in rows {
        let name: String = row.try_get("indicator_name").unwrap_or_default();
        let source: String = row.try_get("source").unwrap_or_default();
        let count: i64 = row.try_get("total_rows").unwrap_or(0);
        let start: Option<String> = row.try_get("first_date").ok().flatten();
        let end: Option<String> = row.try_get("last_date").ok().flatten();

        println!(
            "{:<30} | {:<15} | {:<8} | {:<12} | {:<12}",
            name,
            source,
            count,
            start.unwrap_or_else(|| "N/A".to_string()),
            end.unwrap_or_else(|| "N/A".to_string())
        );
    }

    Ok(())
}
