//! AISHub feed provider.
//!
//! Polls the AISHub web service (https://www.aishub.net/api) for the latest
//! position of every vessel visible to the network.
//!
//! The service answers with a gzip file holding a JSON array: a header object
//! first, then an array of vessel rows in raw AIS encoding. AISHub rejects
//! requests made more often than once per minute.

mod parser;

use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::FeedError;
use crate::models::RawRecord;
use crate::provider::FeedProvider;

pub use parser::{decode_eta, parse_record, RecordError};

pub const DEFAULT_URL: &str = "http://data.aishub.net/ws.php";
const PROVIDER_ID: &str = "AISHUB";

/// Request parameters: AIS encoding, JSON output, gzip compression.
const FORMAT_AIS_ENCODING: &str = "0";
const OUTPUT_JSON: &str = "json";
const COMPRESS_GZIP: &str = "2";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Connection settings for the AISHub service.
#[derive(Clone, Debug)]
pub struct AisHubConfig {
    pub url: String,
    pub username: String,
    pub timeout: Duration,
}

impl AisHubConfig {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: username.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// AISHub provider.
pub struct AisHubProvider {
    client: Client,
    config: AisHubConfig,
}

impl AisHubProvider {
    pub fn new(config: AisHubConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Download the raw response body.
    async fn fetch_body(&self) -> Result<Vec<u8>, FeedError> {
        debug!("AISHub request: {}", self.config.url);

        let response = self
            .client
            .get(&self.config.url)
            .query(&[
                ("username", self.config.username.as_str()),
                ("format", FORMAT_AIS_ENCODING),
                ("output", OUTPUT_JSON),
                ("compress", COMPRESS_GZIP),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    FeedError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Provider {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl FeedProvider for AisHubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_latest(&self) -> Result<Vec<RawRecord>, FeedError> {
        let body = self.fetch_body().await?;
        let rows = decode_response(&body)?;
        let records = extract_records(&rows);

        if records.is_empty() {
            return Err(FeedError::NoData);
        }
        Ok(records)
    }
}

/// Decode a response body into vessel rows.
///
/// The body is gunzipped when it carries the gzip magic number and used as
/// plain JSON otherwise.
pub fn decode_response(body: &[u8]) -> Result<Vec<Map<String, Value>>, FeedError> {
    let json = if body.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(body)
            .read_to_end(&mut decoded)
            .map_err(|e| malformed(format!("invalid gzip body: {}", e)))?;
        decoded
    } else {
        body.to_vec()
    };

    let data: Vec<Value> = serde_json::from_slice(&json)
        .map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    let header = data
        .first()
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("missing response header".to_string()))?;

    if header.get("ERROR").and_then(Value::as_bool).unwrap_or(false) {
        let message = header
            .get("ERROR_MESSAGE")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(FeedError::Provider {
            provider: PROVIDER_ID.to_string(),
            message,
        });
    }

    match data.get(1) {
        None => Err(FeedError::NoData),
        Some(Value::Array(rows)) if rows.is_empty() => Err(FeedError::NoData),
        Some(Value::Array(rows)) => Ok(rows
            .iter()
            .filter_map(|row| row.as_object().cloned())
            .collect()),
        Some(_) => Err(malformed("vessel rows are not an array".to_string())),
    }
}

/// Parse every row, dropping the ones that fail validation.
pub fn extract_records(rows: &[Map<String, Value>]) -> Vec<RawRecord> {
    let mut dropped = 0usize;
    let records: Vec<RawRecord> = rows
        .iter()
        .filter_map(|row| match parse_record(row) {
            Ok(record) => Some(record),
            Err(e) => {
                dropped += 1;
                debug!("Dropping AISHub row: {}", e);
                None
            }
        })
        .collect();

    if dropped > 0 {
        warn!(
            "{} of {} AISHub rows dropped during parsing",
            dropped,
            rows.len()
        );
    }
    records
}

fn malformed(message: String) -> FeedError {
    FeedError::Malformed {
        provider: PROVIDER_ID.to_string(),
        message,
    }
}
