//! Application state management

use crate::config::{DUCKDB_FILE, SQLITE_FILE};
use crate::db::duckdb::DuckDb;
use crate::db::sqlite::models::ScraperSettings;
use crate::db::sqlite::SqliteDb;
use crate::error::Result;
use crate::jobs::{JobController, JobRegistry};
use crate::scraper::{DocumentFetcher, HttpFetcher, UniverseReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared by the API handlers and background tasks
pub struct AppState {
    /// SQLite database (symbol master, connections, settings)
    pub sqlite: Arc<SqliteDb>,

    /// DuckDB unified time-series store
    pub duckdb: Arc<DuckDb>,

    /// Live and recently finished jobs
    pub jobs: Arc<JobRegistry>,

    pub controller: JobController,

    /// Settings as loaded at startup
    pub settings: ScraperSettings,
}

impl AppState {
    /// Open both databases under `data_dir` and wire the job controller
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        // Create data directory if it doesn't exist
        std::fs::create_dir_all(&data_dir)?;

        tracing::info!("Data directory: {:?}", data_dir);

        let sqlite = Arc::new(SqliteDb::new(&data_dir.join(SQLITE_FILE))?);
        let duckdb = Arc::new(DuckDb::new(&data_dir.join(DUCKDB_FILE))?);

        let settings = sqlite.get_settings()?;
        let fetcher = Arc::new(HttpFetcher::new(
            Duration::from_secs(settings.fetch_timeout_secs),
            &settings.user_agent,
        )?);

        Ok(Self::from_parts(sqlite, duckdb, fetcher, settings))
    }

    /// Assemble state from already-open stores
    pub fn from_parts(
        sqlite: Arc<SqliteDb>,
        duckdb: Arc<DuckDb>,
        fetcher: Arc<dyn DocumentFetcher>,
        settings: ScraperSettings,
    ) -> Self {
        let jobs = Arc::new(JobRegistry::new());
        let controller = JobController::new(
            jobs.clone(),
            sqlite.clone(),
            UniverseReader::new(sqlite.clone()),
            fetcher,
            duckdb.clone(),
        )
        .with_default_url_template(settings.default_url_template.clone())
        .with_max_job_errors(settings.max_job_errors);

        Self {
            sqlite,
            duckdb,
            jobs,
            controller,
            settings,
        }
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.settings.finished_job_retention_secs)
    }
}
