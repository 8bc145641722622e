//! Cache Lab - an eviction policy study bench
//!
//! A bounded key-value cache with switchable LRU / LFU / FIFO eviction and TTL
//! expiry, plus a load generator that replays stochastic arrival processes
//! against it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod traffic;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use error::{LabError, Result};
