//! Scraping pipeline components
//!
//! ```text
//! SymbolStore --> UniverseReader --> ScrapeAdapter (DocumentFetcher + MetricParser)
//!                                        --> RecordNormalizer --> RecordSink
//! ```
//!
//! Each stage sits behind a trait so the job controller can be driven by
//! in-memory fakes in tests.

mod fetch;
mod normalizer;
mod parser;
mod types;
mod universe;

use crate::error::Result;
use async_trait::async_trait;

pub use fetch::{build_url, provider_id, HttpFetcher, ScrapeAdapter, DEFAULT_PROVIDER_ID, DEFAULT_URL_TEMPLATE};
pub use normalizer::{RecordNormalizer, CONSOLIDATED, ENTITY_COMPANY, STATEMENT_GROUP_MARKET};
pub use parser::{default_parser_for, HtmlRatioParser, JsonMetricParser};
pub use types::*;
pub use universe::UniverseReader;

/// Backing store for the symbol universe
pub trait SymbolStore: Send + Sync {
    /// Active cash-equity symbols ordered by (exchange, trading_symbol)
    fn load_universe(&self) -> Result<Vec<SymbolDescriptor>>;
}

/// Retrieves raw documents over the network
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Extracts metrics from a fetched document
pub trait MetricParser: Send + Sync {
    fn name(&self) -> &'static str;

    /// Missing fields are omitted; a document with no recognisable field
    /// at all is a `ParseFailure`.
    fn parse(&self, document: &str) -> std::result::Result<Vec<ExtractedMetric>, FetchError>;
}

/// Append-only destination for normalized records
pub trait RecordSink: Send + Sync {
    /// Returns the number of records written
    fn append(&self, records: &[ScrapeRecord]) -> Result<usize>;
}
