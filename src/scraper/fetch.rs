//! Document fetching and the fetch-and-parse adapter

use super::{DocumentFetcher, ExtractedMetric, FetchError, MetricParser, SymbolDescriptor};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Template used when a connection has no URL template of its own
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.screener.in/company/{symbol}/consolidated/";

/// Source identifier stamped on records from the default provider
pub const DEFAULT_PROVIDER_ID: &str = "screener.in";

const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Substitute every `{symbol}` in the template; blank templates use the default provider
pub fn build_url(url_template: &str, trading_symbol: &str) -> String {
    let template = if url_template.trim().is_empty() {
        DEFAULT_URL_TEMPLATE
    } else {
        url_template.trim()
    };
    template.replace(SYMBOL_PLACEHOLDER, trading_symbol)
}

/// Provider identifier for a template: its host without a leading `www.`
pub fn provider_id(url_template: &str) -> String {
    if url_template.trim().is_empty() {
        return DEFAULT_PROVIDER_ID.to_string();
    }

    Url::parse(&url_template.trim().replace(SYMBOL_PLACEHOLDER, "symbol"))
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string())
}

/// HTTP document fetcher with a fixed request timeout and no retries
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::timeout(format!("no response within {}s", self.timeout.as_secs()))
        } else {
            FetchError::network(err.to_string())
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(status.as_u16()));
        }

        response.text().await.map_err(|e| self.classify(e))
    }
}

/// Fetches one symbol's document and runs it through a parser
pub struct ScrapeAdapter {
    fetcher: Arc<dyn DocumentFetcher>,
    parser: Arc<dyn MetricParser>,
    default_template: String,
}

impl ScrapeAdapter {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        parser: Arc<dyn MetricParser>,
        default_template: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            default_template: default_template.into(),
        }
    }

    /// The template actually used for a connection template
    pub fn effective_template<'a>(&'a self, url_template: &'a str) -> &'a str {
        if url_template.trim().is_empty() {
            &self.default_template
        } else {
            url_template
        }
    }

    pub fn resolve_url(&self, symbol: &SymbolDescriptor, url_template: &str) -> String {
        build_url(self.effective_template(url_template), &symbol.trading_symbol)
    }

    pub async fn fetch_and_parse(
        &self,
        symbol: &SymbolDescriptor,
        url_template: &str,
    ) -> std::result::Result<Vec<ExtractedMetric>, FetchError> {
        let url = self.resolve_url(symbol, url_template);
        debug!("Fetching {} from {}", symbol, url);

        let document = self.fetcher.fetch(&url).await?;
        let metrics = self.parser.parse(&document)?;

        debug!(
            "Parsed {} metrics for {} with {}",
            metrics.len(),
            symbol,
            self.parser.name()
        );
        Ok(metrics)
    }
}
