//! Scraper data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable identifier eligible for scraping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDescriptor {
    pub trading_symbol: String,
    pub exchange: String,
}

impl SymbolDescriptor {
    pub fn new(trading_symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            trading_symbol: trading_symbol.into(),
            exchange: exchange.into(),
        }
    }
}

impl fmt::Display for SymbolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.trading_symbol)
    }
}

/// How a connection's documents are retrieved and parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionType {
    WebsiteScraping,
    ApiConnection,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::WebsiteScraping => "WEBSITE_SCRAPING",
            ConnectionType::ApiConnection => "API_CONNECTION",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "WEBSITE_SCRAPING" => Some(ConnectionType::WebsiteScraping),
            "API_CONNECTION" => Some(ConnectionType::ApiConnection),
            _ => None,
        }
    }
}

/// Connection configuration, read-only for the duration of a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub id: i64,
    pub name: String,
    pub base_url_template: String,
    pub connection_type: ConnectionType,
}

/// A single named value pulled out of a fetched document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetric {
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
}

impl ExtractedMetric {
    pub fn new(name: &str, value: f64, unit: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: unit.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Annual,
    Snapshot,
    Event,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Annual => "ANNUAL",
            PeriodType::Snapshot => "SNAPSHOT",
            PeriodType::Event => "EVENT",
        }
    }
}

/// Unified time-series record. Write-once; there is no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRecord {
    pub entity_type: String,
    pub parent_symbol: Option<String>,
    pub symbol: String,
    pub exchange: String,
    pub period_type: PeriodType,
    pub period_key: String,
    pub statement_group: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub unit: Option<String>,
    pub consolidated_flag: String,
    pub source: String,
    pub captured_at: DateTime<Utc>,
    pub metadata: Option<String>,
}

/// Classification of a per-symbol fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchErrorKind {
    Network,
    Timeout,
    HttpStatus(u16),
    ParseFailure,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Network => write!(f, "Network"),
            FetchErrorKind::Timeout => write!(f, "Timeout"),
            FetchErrorKind::HttpStatus(code) => write!(f, "HttpStatus {}", code),
            FetchErrorKind::ParseFailure => write!(f, "ParseFailure"),
        }
    }
}

/// Per-symbol fetch/parse failure. Never fatal to a job.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub detail: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, detail)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Network, detail)
    }

    pub fn http_status(code: u16) -> Self {
        Self::new(FetchErrorKind::HttpStatus(code), format!("server returned {}", code))
    }

    pub fn parse_failure(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::ParseFailure, detail)
    }

    /// Short message surfaced in job status (no transport detail)
    pub fn summary(&self) -> String {
        self.kind.to_string()
    }
}
