//! Metric parsers
//!
//! `HtmlRatioParser` reads the "top ratios" block of a company page by
//! pattern matching on the tag-stripped text. `JsonMetricParser` reads the
//! same metrics from an API response. Both return only the fields found.

use super::{ConnectionType, ExtractedMetric, FetchError, MetricParser};
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

const NUMBER: &str = r"(-?[0-9][0-9,]*(?:\.[0-9]+)?)";

/// (metric name, unit, JSON key aliases in normalised form)
const METRICS: &[(&str, Option<&str>, &[&str])] = &[
    ("market_cap", Some("INR Cr"), &["marketcap", "mcap"]),
    ("current_price", Some("INR"), &["currentprice", "price", "lastprice", "ltp"]),
    ("high_52w", Some("INR"), &["high52w", "52weekhigh", "week52high", "fiftytwoweekhigh"]),
    ("low_52w", Some("INR"), &["low52w", "52weeklow", "week52low", "fiftytwoweeklow"]),
    ("stock_pe", None, &["stockpe", "pe", "peratio"]),
    ("book_value", Some("INR"), &["bookvalue"]),
    ("dividend_yield", Some("%"), &["dividendyield"]),
    ("roce", Some("%"), &["roce"]),
    ("roe", Some("%"), &["roe"]),
    ("face_value", Some("INR"), &["facevalue"]),
];

fn unit_for(name: &str) -> Option<&'static str> {
    METRICS
        .iter()
        .find(|(metric, _, _)| *metric == name)
        .and_then(|(_, unit, _)| *unit)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Pick the parser matching a connection type
pub fn default_parser_for(connection_type: ConnectionType) -> Arc<dyn MetricParser> {
    match connection_type {
        ConnectionType::WebsiteScraping => Arc::new(HtmlRatioParser::new()),
        ConnectionType::ApiConnection => Arc::new(JsonMetricParser),
    }
}

/// Pattern-matching parser for company ratio pages
pub struct HtmlRatioParser {
    tags: Regex,
    whitespace: Regex,
    single: Vec<(&'static str, Regex)>,
    high_low: Regex,
}

impl HtmlRatioParser {
    pub fn new() -> Self {
        let rupee = r"(?:₹|Rs\.?|INR)?\s*";
        let single = [
            ("market_cap", format!(r"(?i)Market\s+Cap\s*{rupee}{NUMBER}")),
            ("current_price", format!(r"(?i)Current\s+Price\s*{rupee}{NUMBER}")),
            ("stock_pe", format!(r"(?i)Stock\s+P/E\s*{NUMBER}")),
            ("book_value", format!(r"(?i)Book\s+Value\s*{rupee}{NUMBER}")),
            ("dividend_yield", format!(r"(?i)Dividend\s+Yield\s*{NUMBER}\s*%")),
            ("roce", format!(r"(?i)\bROCE\s*{NUMBER}\s*%")),
            ("roe", format!(r"(?i)\bROE\s*{NUMBER}\s*%")),
            ("face_value", format!(r"(?i)Face\s+Value\s*{rupee}{NUMBER}")),
        ]
        .into_iter()
        .map(|(name, pattern)| (name, Regex::new(&pattern).expect("metric pattern is valid")))
        .collect();

        Self {
            tags: Regex::new(r"<[^>]*>").expect("tag pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
            single,
            high_low: Regex::new(&format!(
                r"(?i)High\s*/\s*Low\s*{rupee}{NUMBER}\s*/\s*{rupee}{NUMBER}"
            ))
            .expect("high/low pattern is valid"),
        }
    }

    /// Strip markup and collapse whitespace so patterns see plain text
    fn to_text(&self, document: &str) -> String {
        let stripped = self.tags.replace_all(document, " ");
        let decoded = stripped
            .replace("&nbsp;", " ")
            .replace("&#8377;", "₹")
            .replace("&amp;", "&");
        self.whitespace.replace_all(&decoded, " ").into_owned()
    }
}

impl Default for HtmlRatioParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricParser for HtmlRatioParser {
    fn name(&self) -> &'static str {
        "html_ratios"
    }

    fn parse(&self, document: &str) -> Result<Vec<ExtractedMetric>, FetchError> {
        if document.trim().is_empty() {
            return Err(FetchError::parse_failure("empty document"));
        }

        let text = self.to_text(document);
        let mut metrics = Vec::new();

        let mut push = |name: &str, raw: &str| {
            if let Some(value) = parse_number(raw) {
                metrics.push(ExtractedMetric::new(name, value, unit_for(name)));
            }
        };

        for (name, pattern) in &self.single {
            if let Some(caps) = pattern.captures(&text) {
                push(*name, &caps[1]);
            }
        }
        if let Some(caps) = self.high_low.captures(&text) {
            push("high_52w", &caps[1]);
            push("low_52w", &caps[2]);
        }

        if metrics.is_empty() {
            return Err(FetchError::parse_failure("no known metrics found in document"));
        }

        metrics.sort_by_key(|m| METRICS.iter().position(|(name, _, _)| *name == m.name));
        Ok(metrics)
    }
}

/// Parser for JSON API responses; keys are matched case- and punctuation-insensitively
pub struct JsonMetricParser;

impl JsonMetricParser {
    fn normalise_key(key: &str) -> String {
        key.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => parse_number(s.trim_end_matches('%')),
            _ => None,
        }
    }

    /// Depth-first search for the first key matching any alias
    fn find(value: &Value, aliases: &[&str]) -> Option<f64> {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if aliases.contains(&Self::normalise_key(key).as_str()) {
                        if let Some(v) = Self::as_number(child) {
                            return Some(v);
                        }
                    }
                }
                map.values()
                    .filter(|child| child.is_object())
                    .find_map(|child| Self::find(child, aliases))
            }
            _ => None,
        }
    }
}

impl MetricParser for JsonMetricParser {
    fn name(&self) -> &'static str {
        "json_metrics"
    }

    fn parse(&self, document: &str) -> Result<Vec<ExtractedMetric>, FetchError> {
        let root: Value = serde_json::from_str(document)
            .map_err(|e| FetchError::parse_failure(format!("invalid JSON: {}", e)))?;

        if !root.is_object() {
            return Err(FetchError::parse_failure("expected a JSON object"));
        }

        let metrics: Vec<ExtractedMetric> = METRICS
            .iter()
            .filter_map(|(name, unit, aliases)| {
                Self::find(&root, aliases).map(|v| ExtractedMetric::new(name, v, *unit))
            })
            .collect();

        if metrics.is_empty() {
            return Err(FetchError::parse_failure("no known metrics found in response"));
        }
        Ok(metrics)
    }
}
