//! Request Target Module
//!
//! What a load-generator worker calls for each dispatched request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::cache::{FetchOutcome, FetchService};
use crate::error::{LabError, Result};
use crate::models::FetchResponse;
use crate::upstream::{endpoint, parse_base_url};

// == Request Target ==
/// Destination of generated requests.
#[async_trait]
pub trait RequestTarget: Send + Sync {
    /// Performs one request for `key`.
    async fn send(&self, key: &str) -> Result<FetchOutcome>;
}

/// In-process target: requests go straight to the shared fetch service.
#[async_trait]
impl RequestTarget for FetchService {
    async fn send(&self, key: &str) -> Result<FetchOutcome> {
        self.fetch(key).await
    }
}

// == HTTP Cache Target ==
/// Remote target: requests go to another instance's `/cache/fetch/:key`.
#[derive(Debug, Clone)]
pub struct HttpCacheTarget {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCacheTarget {
    /// Creates a target for the cache served at `base_url`.
    ///
    /// Requests that take longer than `timeout` count as failures.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LabError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: parse_base_url(&base_url.into())?,
        })
    }
}

#[async_trait]
impl RequestTarget for HttpCacheTarget {
    async fn send(&self, key: &str) -> Result<FetchOutcome> {
        let response: FetchResponse = self
            .client
            .get(endpoint(&self.base_url, &["cache", "fetch", key])?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.into())
    }
}
