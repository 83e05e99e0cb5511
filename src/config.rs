//! Process-level configuration
//!
//! Only the data directory comes from the environment. Everything else is
//! stored in the SQLite `settings` row.

use std::path::PathBuf;

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "SCRAPER_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "./data";

pub const SQLITE_FILE: &str = "scraper.db";
pub const DUCKDB_FILE: &str = "timeseries.duckdb";

/// Data directory from `SCRAPER_DATA_DIR`, or `./data`
pub fn data_dir_from_env() -> PathBuf {
    resolve_data_dir(std::env::var(DATA_DIR_ENV).ok())
}

fn resolve_data_dir(value: Option<String>) -> PathBuf {
    match value {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}
