//! HTTP transport for the scroll endpoint
//!
//! A thin reqwest client around the search service's `/v1/scroll` endpoint.
//! The first request carries the full query body; every subsequent request
//! carries only the cursor issued by the first response. There is no retry:
//! any transport failure is fatal to the run, and the backend's own error
//! payload is surfaced verbatim to aid diagnosis.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::{ConfigError, Result, TransportError};

/// Timeout applied to each scroll call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Hit keys that exist only for transport purposes (relevance score and
/// pagination sort key) and must never reach the output.
const METADATA_KEYS: [&str; 2] = ["_score", "sort"];

/// A single matched log record as returned by the backend.
///
/// The raw hit object carries transport metadata alongside the log fields.
/// Output paths strip the metadata via [`Record::sanitized`] or go straight
/// to the user-visible fields via [`Record::source_fields`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record(pub Map<String, Value>);

impl Record {
    /// The hit with transport-only metadata removed.
    pub fn sanitized(&self) -> Map<String, Value> {
        let mut fields = self.0.clone();
        for key in METADATA_KEYS {
            fields.remove(key);
        }
        fields
    }

    /// The `_source` sub-map holding the user-visible log fields.
    pub fn source_fields(&self) -> Option<&Map<String, Value>> {
        self.0.get("_source").and_then(Value::as_object)
    }
}

/// One page of matched records from a single scroll call.
#[derive(Debug)]
pub struct ScrollBatch {
    /// Total match count reported by the backend. Only meaningful on the
    /// first batch, and even then only as an estimate.
    pub total: u64,

    /// Cursor to echo back on the next call.
    pub cursor: String,

    /// Matched records, in backend sort order. An empty list is the
    /// terminal signal for the traversal.
    pub records: Vec<Record>,
}

/// Source of scroll batches, consumed by the export driver.
///
/// Abstracting the transport behind this trait keeps the driver loop
/// testable against an in-memory source.
#[async_trait]
pub trait ScrollSource: Send {
    /// Fetch the next batch.
    ///
    /// `cursor` must be `None` on the very first call and the previously
    /// returned cursor on every call after that.
    async fn next_batch(&mut self, cursor: Option<&str>) -> Result<ScrollBatch>;
}

/// Outer scroll response envelope.
///
/// The `hits` member is itself a JSON-encoded document, so decoding happens
/// in two steps.
#[derive(Debug, Deserialize)]
struct ScrollEnvelope {
    #[serde(rename = "scrollId")]
    scroll_id: String,
    hits: String,
}

/// Inner document carried by [`ScrollEnvelope::hits`].
#[derive(Debug, Deserialize)]
struct ScrollPage {
    total: u64,
    hits: Vec<Record>,
}

/// reqwest-backed scroll client holding the initial query.
pub struct ScrollClient {
    http: reqwest::Client,
    endpoint: String,
    query: Value,
}

impl ScrollClient {
    /// Create a client for the configured account.
    pub fn new(config: &ExportConfig, query: Value) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let token =
            HeaderValue::from_str(&config.token).map_err(|_| ConfigError::InvalidToken)?;
        headers.insert("X-API-TOKEN", token);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(TransportError::Request)?;

        Ok(Self {
            http,
            endpoint: format!("{}/v1/scroll", config.base_url),
            query,
        })
    }

    fn decode(envelope: ScrollEnvelope) -> Result<ScrollBatch> {
        let page: ScrollPage = serde_json::from_str(&envelope.hits)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        Ok(ScrollBatch {
            total: page.total,
            cursor: envelope.scroll_id,
            records: page.hits,
        })
    }
}

#[async_trait]
impl ScrollSource for ScrollClient {
    async fn next_batch(&mut self, cursor: Option<&str>) -> Result<ScrollBatch> {
        let body = match cursor {
            Some(id) => json!({ "scroll_id": id }),
            None => self.query.clone(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let envelope: ScrollEnvelope = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        let batch = Self::decode(envelope)?;
        debug!("Fetched scroll page of {} records", batch.records.len());
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw: Value) -> Record {
        Record(raw.as_object().unwrap().clone())
    }

    #[test]
    fn test_sanitized_strips_transport_metadata() {
        let hit = record(json!({
            "_score": 1.3,
            "sort": [1700000000000u64],
            "_source": {"message": "boot", "host": "web-1"},
            "_id": "abc",
        }));

        let sanitized = hit.sanitized();
        assert!(!sanitized.contains_key("_score"));
        assert!(!sanitized.contains_key("sort"));
        assert!(sanitized.contains_key("_source"));
        assert!(sanitized.contains_key("_id"));
    }

    #[test]
    fn test_source_fields_sub_map() {
        let hit = record(json!({
            "_source": {"message": "boot", "level": "info"},
            "sort": [1],
        }));

        let fields = hit.source_fields().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["message"], "boot");
    }

    #[test]
    fn test_source_fields_absent() {
        let hit = record(json!({"_id": "abc"}));
        assert!(hit.source_fields().is_none());
    }

    #[test]
    fn test_envelope_two_step_decode() {
        let inner = json!({
            "total": 2500,
            "hits": [
                {"_score": 1.0, "sort": [1], "_source": {"message": "a"}},
                {"_score": 0.5, "sort": [2], "_source": {"message": "b"}},
            ],
        });
        let outer = json!({
            "scrollId": "cursor-token",
            "hits": inner.to_string(),
        });

        let envelope: ScrollEnvelope = serde_json::from_value(outer).unwrap();
        let batch = ScrollClient::decode(envelope).unwrap();

        assert_eq!(batch.total, 2500);
        assert_eq!(batch.cursor, "cursor-token");
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].source_fields().unwrap()["message"], "a");
    }

    #[test]
    fn test_malformed_inner_hits_is_transport_error() {
        let envelope = ScrollEnvelope {
            scroll_id: "c".to_string(),
            hits: "{not valid".to_string(),
        };
        assert!(matches!(
            ScrollClient::decode(envelope),
            Err(crate::error::ExportError::Transport(
                TransportError::MalformedResponse(_)
            ))
        ));
    }

    #[test]
    fn test_client_endpoint_from_config() {
        let config = ExportConfig {
            token: "secret".to_string(),
            base_url: "https://api-eu.logz.io".to_string(),
            format: crate::config::OutputFormat::Json,
            output: None,
        };
        let client = ScrollClient::new(&config, json!({})).unwrap();
        assert_eq!(client.endpoint, "https://api-eu.logz.io/v1/scroll");
    }
}
