//! Upstream Module
//!
//! Content collaborators consulted by the fetch service on a cache miss.
//!
//! # Sources
//! - `HttpContentSource`: storage service + response generator over HTTP
//! - `SyntheticContentSource`: local payloads with optional simulated latency

mod http;
mod synthetic;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{LabError, Result};

pub use http::HttpContentSource;
pub use synthetic::SyntheticContentSource;

// == Content Source ==
/// Supplies fresh values for keys the cache does not hold.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Resolves the serialized payload for `key`.
    ///
    /// Failures are reported as `LabError::UpstreamFetch`.
    async fn resolve(&self, key: &str) -> Result<String>;

    /// Reports that `key` was served, and whether it came from the cache.
    async fn record_access(&self, _key: &str, _cache_hit: bool) -> Result<()> {
        Ok(())
    }
}

// == URL Helpers ==
/// Parses the base URL of an HTTP collaborator.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| LabError::Config(format!("invalid base URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(LabError::Config(format!("'{}' cannot be used as a base URL", raw)));
    }
    Ok(url)
}

/// Appends `segments` to the path of `base`, percent-encoding each one so a
/// key containing `/` or `?` stays a single segment.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| LabError::Internal(format!("'{}' cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
