//! Maps extracted metrics onto the unified record shape

use super::{ExtractedMetric, PeriodType, ScrapeRecord};
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Kolkata;

pub const ENTITY_COMPANY: &str = "COMPANY";
pub const STATEMENT_GROUP_MARKET: &str = "MARKET";
pub const CONSOLIDATED: &str = "CONSOLIDATED";

/// Stateless normalizer stamping market-snapshot records for one provider
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    source: String,
}

impl RecordNormalizer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// One record per metric, captured now
    pub fn normalize(
        &self,
        symbol: &str,
        exchange: &str,
        metrics: &[ExtractedMetric],
    ) -> Vec<ScrapeRecord> {
        self.normalize_at(symbol, exchange, metrics, Utc::now())
    }

    /// Same as [`normalize`](Self::normalize) with an explicit capture time.
    /// The period key is the trading date in IST.
    pub fn normalize_at(
        &self,
        symbol: &str,
        exchange: &str,
        metrics: &[ExtractedMetric],
        captured_at: DateTime<Utc>,
    ) -> Vec<ScrapeRecord> {
        let period_key = captured_at
            .with_timezone(&Kolkata)
            .format("%Y-%m-%d")
            .to_string();

        metrics
            .iter()
            .map(|metric| ScrapeRecord {
                entity_type: ENTITY_COMPANY.to_string(),
                parent_symbol: None,
                symbol: symbol.to_string(),
                exchange: exchange.to_string(),
                period_type: PeriodType::Snapshot,
                period_key: period_key.clone(),
                statement_group: STATEMENT_GROUP_MARKET.to_string(),
                metric_name: metric.name.clone(),
                metric_value: metric.value,
                unit: metric.unit.clone(),
                consolidated_flag: CONSOLIDATED.to_string(),
                source: self.source.clone(),
                captured_at,
                metadata: None,
            })
            .collect()
    }
}
