//! Cache Module
//!
//! Provides a bounded in-memory cache with TTL expiration, LRU/LFU/FIFO
//! eviction, and a fetch service that resolves misses upstream.

mod entry;
mod ordering;
mod policy;
mod service;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use ordering::EvictionIndex;
pub use policy::PolicyKind;
pub use service::{FetchOutcome, FetchService};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
