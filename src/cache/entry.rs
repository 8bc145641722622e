//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with value and access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored payload, opaque to the store
    pub value: String,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Last read or write timestamp (Unix milliseconds)
    pub last_access_at: u64,
    /// Number of accesses since the last put, starting at 1
    pub access_count: u64,
    /// Store clock reading at insertion
    pub insert_tick: u64,
    /// Store clock reading at the last read or write
    pub access_tick: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// A zero TTL is treated as no expiration; a TTL too large to represent
    /// never expires either.
    pub fn new(key: String, value: String, ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .map(|ttl| now.saturating_add(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)));

        Self {
            key,
            value,
            inserted_at: now,
            last_access_at: now,
            access_count: 1,
            insert_tick: 0,
            access_tick: 0,
            expires_at,
        }
    }

    /// Stamps the store's logical clock as both insertion and access tick.
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.insert_tick = tick;
        self.access_tick = tick;
        self
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiration check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Touch ==
    /// Records a read at logical time `tick`: stamps the access time and bumps
    /// the access count.
    pub fn touch(&mut self, tick: u64) {
        self.last_access_at = current_timestamp_ms();
        self.access_tick = tick;
        self.access_count += 1;
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
