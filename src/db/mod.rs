//! Storage backends
//!
//! - `sqlite`: symbol master, connection configurations, settings
//! - `duckdb`: unified time-series store for scrape records

pub mod sqlite;
pub mod duckdb;
