//! Fetch Service Module
//!
//! External-facing read path: serve from the store, resolve misses through the
//! content source, and keep the store behind a bounded-wait lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, PolicyKind, MAX_KEY_LENGTH};
use crate::error::{LabError, Result};
use crate::upstream::ContentSource;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

// == Fetch Outcome ==
/// Result of a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub key: String,
    pub value: String,
    pub cache_hit: bool,
    pub response_time_ms: u64,
}

// == Fetch Service ==
/// Shared handle over one cache store and its content source.
///
/// Cloning is cheap; every clone talks to the same store.
#[derive(Clone)]
pub struct FetchService {
    store: Arc<RwLock<CacheStore>>,
    source: Arc<dyn ContentSource>,
    fetch_timeout: Duration,
    lock_timeout: Duration,
}

impl FetchService {
    /// Wraps `store` and resolves misses through `source`.
    pub fn new(store: CacheStore, source: Arc<dyn ContentSource>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            source,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Bounds the wait on the content source.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Bounds the wait on the store lock before reporting it unavailable.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<RwLock<CacheStore>> {
        &self.store
    }

    // == Fetch ==
    /// Returns the value for `key`, resolving and caching it on a miss.
    ///
    /// The store lock is not held while the content source is consulted. A
    /// failed resolution leaves the store untouched.
    pub async fn fetch(&self, key: &str) -> Result<FetchOutcome> {
        validate_key(key)?;
        let started = Instant::now();

        let cached = self.write_store().await?.get(key);

        if let Some(value) = cached {
            debug!(key = %key, "cache hit");
            let outcome = FetchOutcome {
                key: key.to_string(),
                value,
                cache_hit: true,
                response_time_ms: elapsed_ms(started),
            };
            self.notify_access(key, true).await;
            return Ok(outcome);
        }

        debug!(key = %key, "cache miss, resolving upstream");
        let value = tokio::time::timeout(self.fetch_timeout, self.source.resolve(key))
            .await
            .map_err(|_| {
                LabError::UpstreamFetch(format!(
                    "resolving '{}' timed out after {:?}",
                    key, self.fetch_timeout
                ))
            })??;

        let evicted = self
            .write_store()
            .await?
            .put(key.to_string(), value.clone(), None);
        if !evicted.is_empty() {
            debug!(key = %key, evicted = evicted.len(), "store over capacity, evicted entries");
        }

        let outcome = FetchOutcome {
            key: key.to_string(),
            value,
            cache_hit: false,
            response_time_ms: elapsed_ms(started),
        };
        self.notify_access(key, false).await;
        Ok(outcome)
    }

    // == Management ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(self.read_store().await?.stats())
    }

    /// Drops every entry; counters survive.
    pub async fn clear(&self) -> Result<usize> {
        let removed = self.write_store().await?.clear();
        info!(removed, "cache cleared");
        Ok(removed)
    }

    /// Zeroes the cumulative counters.
    pub async fn reset_stats(&self) -> Result<()> {
        self.write_store().await?.reset_stats();
        info!("cache statistics reset");
        Ok(())
    }

    /// Switches the eviction policy, optionally rebuilding the index.
    ///
    /// Returns the previous policy.
    pub async fn set_policy(&self, policy: PolicyKind, reindex: bool) -> Result<PolicyKind> {
        let mut store = self.write_store().await?;
        let previous = store.set_policy(policy);
        if reindex {
            store.reindex();
        }
        info!(from = %previous, to = %policy, reindex, "eviction policy changed");
        Ok(previous)
    }

    /// Rebuilds the eviction index under the active policy.
    pub async fn reindex(&self) -> Result<PolicyKind> {
        let mut store = self.write_store().await?;
        store.reindex();
        info!(policy = %store.policy(), entries = store.len(), "eviction index rebuilt");
        Ok(store.policy())
    }

    /// True when the store can be reached within the lock timeout.
    pub async fn is_healthy(&self) -> bool {
        self.read_store().await.is_ok()
    }

    async fn write_store(&self) -> Result<RwLockWriteGuard<'_, CacheStore>> {
        tokio::time::timeout(self.lock_timeout, self.store.write())
            .await
            .map_err(|_| self.unavailable())
    }

    async fn read_store(&self) -> Result<RwLockReadGuard<'_, CacheStore>> {
        tokio::time::timeout(self.lock_timeout, self.store.read())
            .await
            .map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> LabError {
        LabError::CacheUnavailable(format!(
            "store lock not acquired within {:?}",
            self.lock_timeout
        ))
    }

    async fn notify_access(&self, key: &str, cache_hit: bool) {
        if let Err(e) = self.source.record_access(key, cache_hit).await {
            warn!(key = %key, error = %e, "failed to record access upstream");
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(LabError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(LabError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
