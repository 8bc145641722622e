//! HTTP Content Source
//!
//! Resolves misses by loading the question from the storage service and
//! asking the generator service for a response to it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::debug;

use super::{endpoint, parse_base_url, ContentSource};
use crate::error::{LabError, Result};

// == HTTP Content Source ==
/// Content source backed by the storage and generator HTTP services.
///
/// Every call is bounded by the client timeout; timeouts, transport errors and
/// non-success statuses all surface as `LabError::UpstreamFetch`.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
    storage_url: Url,
    generator_url: Url,
}

impl HttpContentSource {
    /// Creates a source talking to `storage_url` and `generator_url`.
    pub fn new(
        storage_url: impl Into<String>,
        generator_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LabError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            storage_url: parse_base_url(&storage_url.into())?,
            generator_url: parse_base_url(&generator_url.into())?,
        })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn resolve(&self, key: &str) -> Result<String> {
        let question: Value = self
            .client
            .get(endpoint(&self.storage_url, &["question", key])?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(key = %key, "question loaded, requesting generated response");

        let response: Value = self
            .client
            .post(endpoint(&self.generator_url, &["generate-response"])?)
            .json(&question)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        serde_json::to_string(&response).map_err(|e| LabError::Internal(e.to_string()))
    }

    async fn record_access(&self, key: &str, cache_hit: bool) -> Result<()> {
        self.client
            .post(endpoint(&self.storage_url, &["question", key, "access"])?)
            .json(&json!({ "cache_hit": cache_hit }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
