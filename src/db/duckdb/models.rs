//! DuckDB data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored scrape record as read back from the time-series store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub symbol: String,
    pub exchange: String,
    pub period_type: String,
    pub period_key: String,
    pub statement_group: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub unit: Option<String>,
    pub source: String,
    pub captured_at: DateTime<Utc>,
    pub metadata: Option<String>,
}
