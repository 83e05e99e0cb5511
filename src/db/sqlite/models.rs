//! SQLite database models

use serde::{Deserialize, Serialize};

/// Row of the symbol master table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRow {
    pub symbol: String,
    pub token: String,
    pub exchange: String,
    pub name: String,
    pub instrument_type: String,
    pub status: String,
}

/// Scraper runtime settings (single row, id = 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperSettings {
    pub api_host: String,
    pub api_port: u16,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub default_url_template: String,
    pub max_job_errors: usize,
    pub finished_job_retention_secs: u64,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            api_host: "127.0.0.1".to_string(),
            api_port: 5100,
            fetch_timeout_secs: 15,
            user_agent: "Mozilla/5.0 (compatible; symbol-scraper/1.0)".to_string(),
            default_url_template: crate::scraper::DEFAULT_URL_TEMPLATE.to_string(),
            max_job_errors: 10,
            finished_job_retention_secs: 3600,
        }
    }
}

/// Partial settings update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
    pub fetch_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub default_url_template: Option<String>,
    pub max_job_errors: Option<usize>,
    pub finished_job_retention_secs: Option<u64>,
}
