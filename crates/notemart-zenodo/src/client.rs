//! HTTP client for the Zenodo records API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use notemart_core::{Error, ExternalQuery, ExternalRecord, ExternalRecordRepository, Result};

use crate::config::ZenodoConfig;

/// Response duration above which a warning is logged.
const SLOW_RESPONSE_MS: u64 = 2_000;

/// Most of the response body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Option<HitsEnvelope>,
}

#[derive(Debug, Default, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Option<Vec<ExternalRecord>>,
}

/// Zenodo-backed [`ExternalRecordRepository`].
pub struct ZenodoClient {
    client: Client,
    config: ZenodoConfig,
}

impl ZenodoClient {
    /// Create a client with the given configuration.
    pub fn new(config: ZenodoConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            authenticated = config.access_token.is_some(),
            timeout_secs = config.timeout_seconds,
            "Initializing Zenodo client"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ZenodoConfig::from_env())
    }

    pub fn config(&self) -> &ZenodoConfig {
        &self.config
    }

    /// Query parameters for a search, token included when configured.
    fn query_params(&self, query: &ExternalQuery) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(text) = query.text.as_deref() {
            params.push(("q", text.to_string()));
        }
        params.push(("size", query.size.to_string()));
        if let Some(sort) = query.sort {
            params.push(("sort", sort.as_str().to_string()));
        }
        if let Some(token) = self.config.access_token.as_deref() {
            params.push(("access_token", token.to_string()));
        }
        params
    }
}

#[async_trait]
impl ExternalRecordRepository for ZenodoClient {
    #[instrument(skip(self, query), fields(
        subsystem = "zenodo",
        component = "client",
        op = "search_records",
        size = query.size,
    ))]
    async fn search_records(&self, query: &ExternalQuery) -> Result<Vec<ExternalRecord>> {
        let start = Instant::now();

        // reqwest errors carry the full URL, access token included.
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| {
                Error::external_unavailable(format!("Request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), "Zenodo returned an error status");
            return Err(Error::external_unavailable(format!(
                "Zenodo returned {}: {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            Error::external_unavailable(format!("Failed to parse response: {}", e.without_url()))
        })?;

        let records = parsed
            .hits
            .and_then(|envelope| envelope.hits)
            .unwrap_or_default();

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            result_count = records.len(),
            duration_ms = elapsed,
            "Zenodo search complete"
        );
        if elapsed > SLOW_RESPONSE_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow Zenodo response");
        }

        Ok(records)
    }
}
