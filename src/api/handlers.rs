//! API Handlers
//!
//! HTTP request handlers for the cache and load generator endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::extract::OptionalJson;
use crate::cache::{CacheStore, FetchService};
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    ActionResponse, CacheStatsResponse, FetchResponse, HealthResponse, PolicyRequest,
    PolicyResponse, StartRequest, StartResponse, StopResponse, TestRequest,
};
use crate::traffic::{
    patterns, HttpCacheTarget, KeyCatalog, LoadPattern, RequestTarget, RunController, RunStats,
};
use crate::upstream::{ContentSource, HttpContentSource, SyntheticContentSource};

/// Key space used when the load generator is built without configuration.
const DEFAULT_KEY_SPACE: u64 = 1000;

/// Application state shared across all handlers.
///
/// Both components are cheap to clone and share their internals.
#[derive(Clone)]
pub struct AppState {
    /// Cache store plus its upstream
    pub cache: FetchService,
    /// Load generator lifecycle
    pub traffic: RunController,
}

impl AppState {
    pub fn new(cache: FetchService, traffic: RunController) -> Self {
        Self { cache, traffic }
    }

    /// Creates a state whose load generator sends straight to `cache`, over a
    /// uniform key space.
    pub fn for_cache(cache: FetchService) -> Self {
        let catalog = KeyCatalog::uniform(DEFAULT_KEY_SPACE);
        let traffic = RunController::new(Arc::new(cache.clone()), catalog);
        Self::new(cache, traffic)
    }

    /// Creates a new AppState from configuration.
    ///
    /// The HTTP content source is used only when both upstream URLs are set;
    /// load goes to `cache_url` when set and to the local cache otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = CacheStore::new(config.max_size, config.default_ttl(), config.policy)
            .with_eviction_headroom(config.eviction_headroom);

        let source: Arc<dyn ContentSource> = match (&config.storage_url, &config.llm_url) {
            (Some(storage), Some(llm)) => {
                info!(storage = %storage, generator = %llm, "using HTTP content source");
                Arc::new(HttpContentSource::new(storage, llm, config.fetch_timeout())?)
            }
            _ => {
                info!("using synthetic content source");
                Arc::new(SyntheticContentSource::new(config.upstream_latency()))
            }
        };

        let cache = FetchService::new(store, source)
            .with_fetch_timeout(config.fetch_timeout())
            .with_lock_timeout(config.lock_timeout());

        let target: Arc<dyn RequestTarget> = match &config.cache_url {
            Some(url) => {
                info!(cache_url = %url, "load generator targets remote cache");
                Arc::new(HttpCacheTarget::new(url, config.fetch_timeout())?)
            }
            None => Arc::new(cache.clone()),
        };

        let catalog = KeyCatalog::new(config.key_space, config.key_popularity)?;
        let traffic = RunController::new(target, catalog)
            .with_workers(config.workers)
            .with_grace_period(config.grace_period());

        Ok(Self::new(cache, traffic))
    }
}

// == Health ==
/// Handler for GET /health
///
/// Returns 503 when the cache store cannot be reached.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.cache.is_healthy().await;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse::new(healthy)))
}

// == Cache ==
/// Handler for GET /cache/fetch/:key
pub async fn fetch_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<FetchResponse>> {
    let outcome = state.cache.fetch(&key).await?;
    Ok(Json(outcome.into()))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheStatsResponse>> {
    let stats = state.cache.stats().await?;
    Ok(Json(stats.into()))
}

/// Handler for POST /cache/clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    let removed = state.cache.clear().await?;
    Ok(Json(ActionResponse::ok(format!(
        "Cache cleared, {} entries removed",
        removed
    ))))
}

/// Handler for POST /cache/policy
pub async fn policy_handler(
    State(state): State<AppState>,
    Json(req): Json<PolicyRequest>,
) -> Result<Json<PolicyResponse>> {
    let policy = req.policy()?;
    let previous = state.cache.set_policy(policy, req.reindex).await?;

    Ok(Json(PolicyResponse {
        success: true,
        policy,
        previous,
        reindexed: req.reindex,
    }))
}

/// Handler for POST /cache/reindex
pub async fn reindex_handler(State(state): State<AppState>) -> Result<Json<PolicyResponse>> {
    let policy = state.cache.reindex().await?;

    Ok(Json(PolicyResponse {
        success: true,
        policy,
        previous: policy,
        reindexed: true,
    }))
}

/// Handler for POST /cache/reset-stats
pub async fn reset_stats_handler(State(state): State<AppState>) -> Result<Json<ActionResponse>> {
    state.cache.reset_stats().await?;
    Ok(Json(ActionResponse::ok("Cache statistics reset")))
}

// == Traffic ==
/// Handler for POST /traffic/start
///
/// An empty body starts the default run; a malformed one is rejected.
pub async fn start_handler(
    State(state): State<AppState>,
    OptionalJson(body): OptionalJson<StartRequest>,
) -> Result<Json<StartResponse>> {
    let req = body.unwrap_or_default();
    let config = req.to_config()?;
    let total = state.traffic.start(config)?;

    Ok(Json(StartResponse::new(config, total)))
}

/// Handler for POST /traffic/stop
pub async fn stop_handler(State(state): State<AppState>) -> Json<StopResponse> {
    let status = state.traffic.stop();
    Json(StopResponse {
        success: true,
        status,
    })
}

/// Handler for GET /traffic/stats
pub async fn traffic_stats_handler(State(state): State<AppState>) -> Json<RunStats> {
    Json(state.traffic.stats())
}

/// Handler for GET /traffic/patterns
pub async fn patterns_handler() -> Json<Vec<LoadPattern>> {
    Json(patterns())
}

/// Handler for POST /traffic/test-request
pub async fn test_request_handler(
    State(state): State<AppState>,
    OptionalJson(body): OptionalJson<TestRequest>,
) -> Result<Json<FetchResponse>> {
    let req = body.unwrap_or_default();
    let outcome = state.traffic.send_one(req.key).await?;
    Ok(Json(outcome.into()))
}
