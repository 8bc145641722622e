//! Response DTOs for the cache lab API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, FetchOutcome, PolicyKind};
use crate::traffic::{RunConfig, RunStatus};

/// Response body for GET /cache/fetch/:key and POST /traffic/test-request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub key: String,
    /// Serialized payload
    pub value: String,
    /// Whether the value was served from the cache
    pub cache_hit: bool,
    pub response_time_ms: u64,
}

impl From<FetchOutcome> for FetchResponse {
    fn from(outcome: FetchOutcome) -> Self {
        Self {
            key: outcome.key,
            value: outcome.value,
            cache_hit: outcome.cache_hit,
            response_time_ms: outcome.response_time_ms,
        }
    }
}

impl From<FetchResponse> for FetchOutcome {
    fn from(response: FetchResponse) -> Self {
        Self {
            key: response.key,
            value: response.value,
            cache_hit: response.cache_hit,
            response_time_ms: response.response_time_ms,
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub evictions: u64,
    pub expirations: u64,
    pub current_size: usize,
    pub max_size: usize,
    /// current_size / max_size
    pub utilization: f64,
    pub policy: PolicyKind,
    /// Default TTL in seconds, 0 = no expiration
    pub ttl: u64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            miss_rate: stats.miss_rate(),
            utilization: stats.utilization(),
            hits: stats.hits,
            misses: stats.misses,
            total_requests: stats.total_requests,
            evictions: stats.evictions,
            expirations: stats.expirations,
            current_size: stats.current_size,
            max_size: stats.max_size,
            policy: stats.policy,
            ttl: stats.ttl_secs,
        }
    }
}

/// Generic acknowledgement for state-changing endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response body for POST /cache/policy and POST /cache/reindex
#[derive(Debug, Clone, Serialize)]
pub struct PolicyResponse {
    pub success: bool,
    pub policy: PolicyKind,
    /// Policy active before the call
    pub previous: PolicyKind,
    /// Whether index scores were rebuilt
    pub reindexed: bool,
}

/// Response body for POST /traffic/start
#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub message: String,
    pub config: RunConfig,
    pub total_scheduled: usize,
}

impl StartResponse {
    pub fn new(config: RunConfig, total_scheduled: usize) -> Self {
        Self {
            success: true,
            message: format!(
                "Load run started: {} arrivals at {}/s over {}s ({})",
                total_scheduled, config.rate, config.duration, config.distribution
            ),
            config,
            total_scheduled,
        }
    }
}

/// Response body for POST /traffic/stop
#[derive(Debug, Clone, Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub status: RunStatus,
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    pub service: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn new(healthy: bool) -> Self {
        Self {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
