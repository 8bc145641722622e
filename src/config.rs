//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::PolicyKind;
use crate::error::{LabError, Result};
use crate::traffic::KeyPopularity;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. A variable that is set but cannot be parsed is an error.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// Eviction policy at startup
    pub policy: PolicyKind,
    /// Default TTL in seconds, 0 = entries never expire
    pub ttl: u64,
    /// Extra entries evicted on overflow
    pub eviction_headroom: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Load generator worker pool size
    pub workers: usize,
    /// Seconds a finished schedule waits for in-flight requests
    pub grace_period: u64,
    /// Upstream and remote target request timeout in seconds
    pub fetch_timeout: u64,
    /// Maximum wait for the cache lock in milliseconds
    pub lock_timeout_ms: u64,
    /// Number of distinct keys the load generator requests
    pub key_space: u64,
    pub key_popularity: KeyPopularity,
    /// Storage service base URL
    pub storage_url: Option<String>,
    /// Response generator base URL
    pub llm_url: Option<String>,
    /// Simulated latency of the synthetic content source in milliseconds
    pub upstream_latency_ms: u64,
    /// Remote cache base URL; load is sent in-process when unset
    pub cache_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Cache capacity (default: 1000)
    /// - `POLICY` - `lru`, `lfu` or `fifo` (default: lru)
    /// - `TTL` - Default TTL in seconds, 0 = never (default: 3600)
    /// - `EVICTION_HEADROOM` - Extra evictions on overflow (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `WORKERS` - Load generator workers (default: 10)
    /// - `GRACE_PERIOD` - Seconds to wait for in-flight requests (default: 5)
    /// - `FETCH_TIMEOUT` - Upstream timeout in seconds (default: 30)
    /// - `LOCK_TIMEOUT_MS` - Cache lock timeout (default: 1000)
    /// - `KEY_SPACE` - Distinct request keys (default: 1000)
    /// - `KEY_POPULARITY` - `uniform` or `zipf` (default: uniform)
    /// - `ZIPF_EXPONENT` - Zipf skew when popularity is zipf (default: 1.0)
    /// - `STORAGE_URL`, `LLM_URL` - HTTP content source, used when both are set
    /// - `UPSTREAM_LATENCY_MS` - Synthetic source latency (default: 0)
    /// - `CACHE_URL` - Remote cache to send load to
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let key_popularity = match parse_var::<KeyPopularity>("KEY_POPULARITY")? {
            Some(KeyPopularity::Zipf { .. }) => KeyPopularity::Zipf {
                exponent: parse_var("ZIPF_EXPONENT")?.unwrap_or(1.0),
            },
            Some(popularity) => popularity,
            None => defaults.key_popularity,
        };

        let config = Self {
            max_size: parse_var("MAX_SIZE")?.unwrap_or(defaults.max_size),
            policy: parse_var("POLICY")?.unwrap_or(defaults.policy),
            ttl: parse_var("TTL")?.unwrap_or(defaults.ttl),
            eviction_headroom: parse_var("EVICTION_HEADROOM")?
                .unwrap_or(defaults.eviction_headroom),
            server_port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server_port),
            workers: parse_var("WORKERS")?.unwrap_or(defaults.workers),
            grace_period: parse_var("GRACE_PERIOD")?.unwrap_or(defaults.grace_period),
            fetch_timeout: parse_var("FETCH_TIMEOUT")?.unwrap_or(defaults.fetch_timeout),
            lock_timeout_ms: parse_var("LOCK_TIMEOUT_MS")?.unwrap_or(defaults.lock_timeout_ms),
            key_space: parse_var("KEY_SPACE")?.unwrap_or(defaults.key_space),
            key_popularity,
            storage_url: string_var("STORAGE_URL"),
            llm_url: string_var("LLM_URL"),
            upstream_latency_ms: parse_var("UPSTREAM_LATENCY_MS")?
                .unwrap_or(defaults.upstream_latency_ms),
            cache_url: string_var("CACHE_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the components cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(LabError::Config("MAX_SIZE must be at least 1".to_string()));
        }
        if self.workers == 0 {
            return Err(LabError::Config("WORKERS must be at least 1".to_string()));
        }
        if self.key_space == 0 {
            return Err(LabError::Config("KEY_SPACE must be at least 1".to_string()));
        }
        if let KeyPopularity::Zipf { exponent } = self.key_popularity {
            if !exponent.is_finite() || exponent < 0.0 {
                return Err(LabError::Config(format!(
                    "ZIPF_EXPONENT must be a non-negative number, got {}",
                    exponent
                )));
            }
        }
        Ok(())
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn upstream_latency(&self) -> Duration {
        Duration::from_millis(self.upstream_latency_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: 1000,
            policy: PolicyKind::Lru,
            ttl: 3600,
            eviction_headroom: 0,
            server_port: 3000,
            workers: 10,
            grace_period: 5,
            fetch_timeout: 30,
            lock_timeout_ms: 1000,
            key_space: 1000,
            key_popularity: KeyPopularity::Uniform,
            storage_url: None,
            llm_url: None,
            upstream_latency_ms: 0,
            cache_url: None,
        }
    }
}

/// Reads a non-empty variable, trimmed.
fn string_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses `name` when it is set; unset or blank yields `None`.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    string_var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| LabError::Config(format!("invalid {} '{}': {}", name, raw, e)))
        })
        .transpose()
}
