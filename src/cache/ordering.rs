//! Eviction Index Module
//!
//! Scored, ordered key set backing every eviction policy.
//!
//! Each tracked key carries a score and a sequence number. Keys are ordered by
//! `(score, seq)`; the lowest pair is evicted first. Policies only differ in the
//! score they assign:
//! - LRU: the logical tick of the last access
//! - LFU: the access count
//! - FIFO: the logical tick of the insertion

use std::collections::{BTreeMap, HashMap};

/// Position of a key inside the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    score: u64,
    seq: u64,
}

// == Eviction Index ==
/// Ordered key index used to pick eviction victims.
///
/// `ranks` and `order` always hold the same key set.
#[derive(Debug, Default)]
pub struct EvictionIndex {
    /// Key -> current rank
    ranks: HashMap<String, Rank>,
    /// Rank -> key, lowest rank is the next victim
    order: BTreeMap<Rank, String>,
    /// Monotonic tie breaker, bumped on every (re)score
    next_seq: u64,
}

impl EvictionIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // == Set Score ==
    /// Inserts `key` or replaces its score.
    ///
    /// A rescored key moves behind every other key holding the same score.
    pub fn set_score(&mut self, key: &str, score: u64) {
        if let Some(old) = self.ranks.remove(key) {
            self.order.remove(&old);
        }
        let rank = Rank {
            score,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.ranks.insert(key.to_string(), rank);
        self.order.insert(rank, key.to_string());
    }

    // == Increment ==
    /// Adds `delta` to the score of `key`, inserting it with `delta` if absent.
    pub fn increment(&mut self, key: &str, delta: u64) {
        let score = self
            .ranks
            .get(key)
            .map_or(delta, |rank| rank.score.saturating_add(delta));
        self.set_score(key, score);
    }

    // == Remove ==
    /// Removes a key from the index.
    pub fn remove(&mut self, key: &str) {
        if let Some(rank) = self.ranks.remove(key) {
            self.order.remove(&rank);
        }
    }

    // == Pop Lowest ==
    /// Returns and removes the next eviction victim.
    ///
    /// Returns None if the index is empty.
    pub fn pop_lowest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ranks.remove(&key);
        Some(key)
    }

    // == Peek Lowest ==
    /// Returns the next eviction victim without removing it.
    pub fn peek_lowest(&self) -> Option<&String> {
        self.order.values().next()
    }

    /// Current score of `key`, if tracked.
    pub fn score(&self, key: &str) -> Option<u64> {
        self.ranks.get(key).map(|rank| rank.score)
    }

    /// Keys from next victim to last victim.
    pub fn keys_in_order(&self) -> impl Iterator<Item = &String> {
        self.order.values()
    }

    /// Drops every key.
    pub fn clear(&mut self) {
        self.ranks.clear();
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.ranks.contains_key(key)
    }
}
