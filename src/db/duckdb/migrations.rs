//! DuckDB migrations

use crate::error::Result;
use duckdb::Connection;

/// Run all DuckDB migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            name VARCHAR PRIMARY KEY,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    run_migration(conn, "001_scrape_records", CREATE_SCRAPE_RECORDS)?;

    tracing::info!("DuckDB migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM migrations WHERE name = ?",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running DuckDB migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_SCRAPE_RECORDS: &str = r#"
CREATE TABLE IF NOT EXISTS scrape_records (
    entity_type VARCHAR NOT NULL,
    parent_symbol VARCHAR,
    symbol VARCHAR NOT NULL,
    exchange VARCHAR NOT NULL,
    period_type VARCHAR NOT NULL,
    period_key VARCHAR NOT NULL,
    statement_group VARCHAR NOT NULL,
    metric_name VARCHAR NOT NULL,
    metric_value DOUBLE NOT NULL,
    unit VARCHAR,
    consolidated_flag VARCHAR NOT NULL,
    source VARCHAR NOT NULL,
    captured_at TIMESTAMPTZ NOT NULL,
    metadata VARCHAR
);

CREATE INDEX IF NOT EXISTS idx_scrape_records_coord
    ON scrape_records(symbol, period_key, statement_group, metric_name);
"#;
