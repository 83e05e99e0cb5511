//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_symtoken", CREATE_SYMTOKEN_TABLE)?;
    run_migration(conn, "002_connections", CREATE_CONNECTIONS_TABLE)?;
    run_migration(conn, "003_settings", CREATE_SETTINGS_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_SYMTOKEN_TABLE: &str = r#"
CREATE TABLE symtoken (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL,
    token TEXT NOT NULL,
    exchange TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    instrument_type TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    UNIQUE (exchange, symbol)
);

CREATE INDEX idx_symtoken_universe ON symtoken(status, instrument_type);
"#;

const CREATE_CONNECTIONS_TABLE: &str = r#"
CREATE TABLE connections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    base_url_template TEXT NOT NULL DEFAULT '',
    connection_type TEXT NOT NULL DEFAULT 'WEBSITE_SCRAPING',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_SETTINGS_TABLE: &str = r#"
CREATE TABLE settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    api_host TEXT NOT NULL DEFAULT '127.0.0.1',
    api_port INTEGER NOT NULL DEFAULT 5100,
    fetch_timeout_secs INTEGER NOT NULL DEFAULT 15,
    user_agent TEXT NOT NULL DEFAULT 'Mozilla/5.0 (compatible; symbol-scraper/1.0)',
    default_url_template TEXT NOT NULL DEFAULT 'https://www.screener.in/company/{symbol}/consolidated/',
    max_job_errors INTEGER NOT NULL DEFAULT 10,
    finished_job_retention_secs INTEGER NOT NULL DEFAULT 3600,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT INTO settings (id) VALUES (1);
"#;
