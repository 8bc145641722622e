//! Synthetic Content Source
//!
//! Builds payloads in-process so the cache can be studied without the
//! storage and generator services.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::ContentSource;
use crate::error::Result;

/// In-process content source with an optional simulated resolution latency.
#[derive(Debug, Clone, Default)]
pub struct SyntheticContentSource {
    latency: Duration,
}

impl SyntheticContentSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl ContentSource for SyntheticContentSource {
    async fn resolve(&self, key: &str) -> Result<String> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(json!({
            "key": key,
            "answer": format!("synthetic answer for {}", key),
            "generated_at": chrono::Utc::now().to_rfc3339(),
        })
        .to_string())
    }
}
