//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use crate::cache::PolicyKind;

// == Cache Stats ==
/// Cumulative counters plus a point-in-time view of the store's shape.
///
/// Every lookup is counted exactly once as a hit or a miss, so
/// `hits + misses == total_requests` always holds.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of lookups served from the cache
    pub hits: u64,
    /// Number of lookups that found nothing (absent or expired)
    pub misses: u64,
    /// Number of lookups
    pub total_requests: u64,
    /// Number of entries removed by the eviction policy
    pub evictions: u64,
    /// Number of entries dropped lazily after their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub current_size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// Active eviction policy
    pub policy: PolicyKind,
    /// Default TTL in seconds, 0 = no expiration
    pub ttl_secs: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / total_requests, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.total_requests)
    }

    /// Returns misses / total_requests, or 0.0 if no requests have been made.
    pub fn miss_rate(&self) -> f64 {
        ratio(self.misses, self.total_requests)
    }

    /// Fraction of the capacity currently in use.
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.current_size as f64 / self.max_size as f64
        }
    }

    // == Record Hit ==
    /// Counts a lookup served from the cache.
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total_requests += 1;
    }

    // == Record Miss ==
    /// Counts a lookup that found nothing.
    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.total_requests += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Zeroes the cumulative counters, leaving the shape fields intact.
    pub fn reset_counters(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.total_requests = 0;
        self.evictions = 0;
        self.expirations = 0;
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
