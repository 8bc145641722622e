//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with a policy-driven eviction
//! index and lazy TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionIndex, PolicyKind};

// == Cache Store ==
/// Bounded cache storage with pluggable eviction and TTL support.
///
/// `entries` and `index` always hold the same key set, and `entries.len()`
/// never exceeds `max_size` once a put returns.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Eviction ordering for the active policy
    index: EvictionIndex,
    /// Cumulative counters
    stats: CacheStats,
    /// Active eviction policy
    policy: PolicyKind,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL applied when a put does not specify one
    default_ttl: Duration,
    /// Extra entries removed per overflow to amortize eviction
    eviction_headroom: usize,
    /// Logical clock, advanced by every put and hit
    clock: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity, default TTL and policy.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL for entries stored without one (zero = never expires)
    /// * `policy` - Initial eviction policy
    pub fn new(max_size: usize, default_ttl: Duration, policy: PolicyKind) -> Self {
        Self {
            entries: HashMap::new(),
            index: EvictionIndex::new(),
            stats: CacheStats::new(),
            policy,
            max_size,
            default_ttl,
            eviction_headroom: 0,
            clock: 0,
        }
    }

    /// Sets how many entries beyond the overflow are evicted at once.
    pub fn with_eviction_headroom(mut self, headroom: usize) -> Self {
        self.eviction_headroom = headroom;
        self
    }

    // == Put ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// Overwrites reset the entry's metadata and its place in the eviction
    /// index. Returns the keys evicted to bring the store back under capacity.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The payload to store
    /// * `ttl` - Optional TTL (uses the default TTL if None)
    pub fn put(&mut self, key: String, value: String, ttl: Option<Duration>) -> Vec<String> {
        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        let tick = self.tick();
        let entry = CacheEntry::new(key.clone(), value, Some(effective_ttl)).with_tick(tick);

        let score = match self.policy {
            PolicyKind::Lru | PolicyKind::Fifo => tick,
            PolicyKind::Lfu => 1,
        };
        self.index.set_score(&key, score);
        self.entries.insert(key, entry);

        self.enforce_capacity()
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are removed
    /// on the spot and counted as misses.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.index.remove(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            debug!(key = %key, "dropped expired entry");
            return None;
        }

        let tick = self.tick();
        match self.policy {
            PolicyKind::Lru => self.index.set_score(key, tick),
            PolicyKind::Lfu => self.index.increment(key, 1),
            PolicyKind::Fifo => {}
        }

        self.stats.record_hit();
        self.entries.get_mut(key).map(|entry| {
            entry.touch(tick);
            entry.value.clone()
        })
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            current_size: self.entries.len(),
            max_size: self.max_size,
            policy: self.policy,
            ttl_secs: self.default_ttl.as_secs(),
            ..self.stats.clone()
        }
    }

    /// Zeroes the hit/miss/eviction counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset_counters();
    }

    // == Clear ==
    /// Removes every entry. Counters are left untouched.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.index.clear();
        removed
    }

    // == Policy ==
    /// Returns the active eviction policy.
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Swaps the eviction policy for future operations and returns the old one.
    ///
    /// Scores already in the index keep the meaning of the previous policy, so
    /// entries scored before the switch are ranked by stale data until they are
    /// touched again or [`CacheStore::reindex`] is called.
    pub fn set_policy(&mut self, policy: PolicyKind) -> PolicyKind {
        std::mem::replace(&mut self.policy, policy)
    }

    /// Rebuilds every index score from entry metadata under the active policy.
    ///
    /// Recency and insertion order come from the logical clock, so entries
    /// written within the same millisecond still rank by operation order.
    /// Entries with equal access counts keep their previous relative order.
    pub fn reindex(&mut self) {
        let mut keys: Vec<String> = self.index.keys_in_order().cloned().collect();
        let entries = &self.entries;
        let metric = |key: &String| -> u64 {
            entries.get(key).map_or(0, |entry| match self.policy {
                PolicyKind::Lru => entry.access_tick,
                PolicyKind::Lfu => entry.access_count,
                PolicyKind::Fifo => entry.insert_tick,
            })
        };
        keys.sort_by_key(metric);

        self.index.clear();
        for key in keys {
            let score = match self.policy {
                PolicyKind::Lfu => self.entries.get(&key).map_or(1, |entry| entry.access_count),
                PolicyKind::Lru | PolicyKind::Fifo => self.tick(),
            };
            self.index.set_score(&key, score);
        }
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks for a key without touching counters or ordering.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys from next eviction victim to last.
    pub fn eviction_order(&self) -> Vec<String> {
        self.index.keys_in_order().cloned().collect()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn enforce_capacity(&mut self) -> Vec<String> {
        let size = self.entries.len();
        if size <= self.max_size {
            return Vec::new();
        }

        let to_evict = (size - self.max_size + self.eviction_headroom).min(size);
        let mut evicted = Vec::with_capacity(to_evict);
        while evicted.len() < to_evict {
            let Some(key) = self.index.pop_lowest() else {
                break;
            };
            self.entries.remove(&key);
            self.stats.record_eviction();
            debug!(key = %key, policy = %self.policy, "evicted entry");
            evicted.push(key);
        }
        evicted
    }
}
