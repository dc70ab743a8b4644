//! Durable key-value backend over a Redis-style REST API.
//!
//! The whole collection is kept as one JSON string under a single key:
//!
//! - `GET  {base}/get/{key}` → `{"result": null}` or `{"result": "<json>"}`
//! - `POST {base}/set/{key}` with the JSON as body → `{"result": "OK"}`
//!
//! Both calls carry `Authorization: Bearer <token>`. Failures come back as a
//! non-2xx status and/or `{"error": "..."}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use noticeboard_core::constants::{DEFAULT_KV_KEY, DEFAULT_KV_TIMEOUT_SECS};
use noticeboard_core::error::{BoardError, Result};
use noticeboard_core::traits::CollectionBackend;
use noticeboard_core::types::Announcement;

use crate::codec::{decode_collection, decode_value, encode_collection};

/// Connection settings for the key-value service.
#[derive(Clone)]
pub struct KvConfig {
    /// Base REST URL, e.g. `https://example.upstash.io`
    pub url: String,
    /// Bearer token
    pub token: String,
    /// Key holding the collection
    pub key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl KvConfig {
    /// Creates config with the default key and timeout.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            key: DEFAULT_KV_KEY.into(),
            timeout_seconds: DEFAULT_KV_TIMEOUT_SECS,
        }
    }

    /// Uses a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Uses a different request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for KvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("key", &self.key)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Response envelope of the REST API.
#[derive(Debug, Deserialize)]
struct KvResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Key-value backend.
pub struct KvBackend {
    base_url: Url,
    token: String,
    key: String,
    http_client: reqwest::Client,
}

impl KvBackend {
    /// Creates a backend from `config`. No request is made until first use.
    pub fn new(config: KvConfig) -> Result<Self> {
        let base_url = Url::parse(config.url.trim())
            .map_err(|e| BoardError::ConfigError(format!("invalid key-value URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BoardError::ConfigError(format!(
                "key-value URL cannot carry a path: {}",
                config.url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BoardError::ConfigError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            token: config.token,
            key: config.key,
            http_client,
        })
    }

    /// Returns the key holding the collection.
    pub fn key(&self) -> &str {
        &self.key
    }

    fn endpoint(&self, command: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(command).push(&self.key);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BoardError::HttpError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BoardError::HttpError(e.to_string()))?;
        let parsed: Option<KvResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|body| body.error)
                .unwrap_or(text);
            return Err(BoardError::KvError {
                status: status.as_u16(),
                message,
            });
        }

        let body = parsed.ok_or_else(|| BoardError::KvError {
            status: status.as_u16(),
            message: format!("unexpected response body: {text}"),
        })?;

        match body.error {
            Some(message) => Err(BoardError::KvError {
                status: status.as_u16(),
                message,
            }),
            None => Ok(body.result),
        }
    }
}

#[async_trait]
impl CollectionBackend for KvBackend {
    fn name(&self) -> &'static str {
        "kv"
    }

    #[instrument(skip(self), fields(key = %self.key))]
    async fn load(&self) -> Result<Vec<Announcement>> {
        let result = self.send(self.http_client.get(self.endpoint("get"))).await?;

        let announcements = match result {
            // Key never written
            Value::Null => Vec::new(),
            Value::String(raw) => decode_collection(&raw)?,
            other => decode_value(other)?,
        };

        debug!(count = announcements.len(), "Loaded announcements from key-value service");
        Ok(announcements)
    }

    #[instrument(skip(self, announcements), fields(key = %self.key, count = announcements.len()))]
    async fn save(&self, announcements: &[Announcement]) -> Result<()> {
        let payload = encode_collection(announcements)?;
        self.send(self.http_client.post(self.endpoint("set")).body(payload))
            .await?;
        debug!("Saved announcements to key-value service");
        Ok(())
    }
}
