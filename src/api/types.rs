//! REST API request and response types
//!
//! Clients may send numeric ids either as JSON numbers or as strings, so
//! the id fields use a flexible deserializer.

use crate::jobs::JobState;
use crate::scraper::ConnectionType;
use serde::{Deserialize, Deserializer, Serialize};

/// Accept a number or a numeric string
fn deserialize_flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleInt {
        Int(i64),
        Str(String),
    }

    match FlexibleInt::deserialize(deserializer)? {
        FlexibleInt::Int(i) => Ok(i),
        FlexibleInt::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success_with_message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn success_with_data(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_both(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: Some(data),
        }
    }
}

/// Placeholder for responses without a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}

// ============================================================================
// Scrape job requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StartScrapeRequest {
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub connection_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopScrapeRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartScrapeData {
    pub job_id: String,
    pub connection_id: i64,
    pub status: JobState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopScrapeData {
    pub job_id: String,
    /// False when the job had already finished
    pub stop_requested: bool,
    pub status: JobState,
}

// ============================================================================
// Connections
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    #[serde(default)]
    pub base_url_template: String,
    #[serde(default = "default_connection_type")]
    pub connection_type: ConnectionType,
}

fn default_connection_type() -> ConnectionType {
    ConnectionType::WebsiteScraping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_accepts_string_or_number() {
        let a: StartScrapeRequest = serde_json::from_str(r#"{"connection_id": 3}"#).unwrap();
        let b: StartScrapeRequest = serde_json::from_str(r#"{"connection_id": " 3 "}"#).unwrap();
        assert_eq!(a.connection_id, 3);
        assert_eq!(b.connection_id, 3);
        assert!(serde_json::from_str::<StartScrapeRequest>(r#"{"connection_id": "x"}"#).is_err());
    }

    #[test]
    fn test_envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::<Empty>::success_with_message("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "message": "ok"}));
    }

    #[test]
    fn test_create_connection_defaults() {
        let req: CreateConnectionRequest = serde_json::from_str(r#"{"name": "screener"}"#).unwrap();
        assert_eq!(req.base_url_template, "");
        assert_eq!(req.connection_type, ConnectionType::WebsiteScraping);
    }
}
