//! SQLite database module
//!
//! Holds the symbol master, connection configurations and runtime settings.

pub mod models;
mod migrations;
mod connections;
mod symbol;
mod settings;

use crate::error::Result;
use crate::jobs::ConnectionStore;
use crate::scraper::{ConnectionConfig, ConnectionType, SymbolDescriptor, SymbolStore};
use models::{ScraperSettings, SettingsUpdate, SymbolRow};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::from_connection(conn)
    }

    /// Create an in-memory database (tests and dry runs)
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

    // ========== Symbol Methods ==========

    /// Replace the symbol master
    pub fn store_symbols(&self, symbols: &[SymbolRow]) -> Result<()> {
        let mut conn = self.conn.lock();
        symbol::store_symbols(&mut conn, symbols)
    }

    /// Load the filtered, ordered scrape universe
    pub fn load_universe(&self) -> Result<Vec<SymbolDescriptor>> {
        let conn = self.conn.lock();
        symbol::load_universe(&conn)
    }

    // ========== Connection Methods ==========

    /// Get connection configuration by id
    pub fn get_connection(&self, id: i64) -> Result<Option<ConnectionConfig>> {
        let conn = self.conn.lock();
        connections::get_connection(&conn, id)
    }

    /// List all connection configurations
    pub fn list_connections(&self) -> Result<Vec<ConnectionConfig>> {
        let conn = self.conn.lock();
        connections::list_connections(&conn)
    }

    /// Insert a connection configuration
    pub fn insert_connection(
        &self,
        name: &str,
        base_url_template: &str,
        connection_type: ConnectionType,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        connections::insert_connection(&conn, name, base_url_template, connection_type)
    }

    // ========== Settings Methods ==========

    /// Get settings
    pub fn get_settings(&self) -> Result<ScraperSettings> {
        let conn = self.conn.lock();
        settings::get_settings(&conn)
    }

    /// Update settings
    pub fn update_settings(&self, update: SettingsUpdate) -> Result<ScraperSettings> {
        let conn = self.conn.lock();
        settings::update_settings(&conn, update)
    }
}

impl SymbolStore for SqliteDb {
    fn load_universe(&self) -> Result<Vec<SymbolDescriptor>> {
        SqliteDb::load_universe(self)
    }
}

impl ConnectionStore for SqliteDb {
    fn get_connection(&self, id: i64) -> Result<Option<ConnectionConfig>> {
        SqliteDb::get_connection(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_on_disk_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scraper.db");

        {
            let db = SqliteDb::new(&path).unwrap();
            db.insert_connection("screener", "", ConnectionType::WebsiteScraping)
                .unwrap();
        }

        let db = SqliteDb::new(&path).unwrap();
        let found = db.get_connection(1).unwrap().unwrap();
        assert_eq!(found.name, "screener");
        assert_eq!(db.get_settings().unwrap().fetch_timeout_secs, 15);
    }
}
