//! DuckDB database module for the unified time-series store

pub mod models;
mod migrations;

use crate::error::Result;
use crate::scraper::{RecordSink, ScrapeRecord};
use chrono::DateTime;
use duckdb::Connection;
use models::StoredRecord;
use parking_lot::Mutex;
use std::path::Path;

/// DuckDB database wrapper
pub struct DuckDb {
    conn: Mutex<Connection>,
}

impl DuckDb {
    /// Create new DuckDB connection
    pub fn new(path: &Path) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    /// Append scrape records in one transaction
    pub fn append_records(&self, records: &[ScrapeRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock();

        let tx = conn.transaction()?;

        let mut stmt = tx.prepare(
            "INSERT INTO scrape_records (entity_type, parent_symbol, symbol, exchange, period_type,
               period_key, statement_group, metric_name, metric_value, unit, consolidated_flag,
               source, captured_at, metadata)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CAST(? AS TIMESTAMPTZ), ?)",
        )?;

        let mut count = 0;
        for record in records {
            let captured_at = record
                .captured_at
                .format("%Y-%m-%d %H:%M:%S%.6f+00:00")
                .to_string();

            stmt.execute(duckdb::params![
                record.entity_type,
                record.parent_symbol,
                record.symbol,
                record.exchange,
                record.period_type.as_str(),
                record.period_key,
                record.statement_group,
                record.metric_name,
                record.metric_value,
                record.unit,
                record.consolidated_flag,
                record.source,
                captured_at,
                record.metadata,
            ])?;
            count += 1;
        }

        drop(stmt);
        tx.commit()?;

        Ok(count)
    }

    /// Query stored records for a symbol, oldest first
    pub fn query_records(&self, symbol: &str, exchange: &str) -> Result<Vec<StoredRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT symbol, exchange, period_type, period_key, statement_group, metric_name,
                    metric_value, unit, source,
                    epoch_ms(captured_at), metadata
             FROM scrape_records
             WHERE symbol = ? AND exchange = ?
             ORDER BY captured_at ASC, metric_name ASC",
        )?;

        let rows = stmt
            .query_map(duckdb::params![symbol, exchange], |row| {
                let captured_ms: i64 = row.get(9)?;
                Ok(StoredRecord {
                    symbol: row.get(0)?,
                    exchange: row.get(1)?,
                    period_type: row.get(2)?,
                    period_key: row.get(3)?,
                    statement_group: row.get(4)?,
                    metric_name: row.get(5)?,
                    metric_value: row.get(6)?,
                    unit: row.get(7)?,
                    source: row.get(8)?,
                    captured_at: DateTime::from_timestamp_millis(captured_ms).unwrap_or_default(),
                    metadata: row.get(10)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Total number of stored records
    pub fn count_records(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM scrape_records", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RecordSink for DuckDb {
    fn append(&self, records: &[ScrapeRecord]) -> Result<usize> {
        self.append_records(records)
    }
}
