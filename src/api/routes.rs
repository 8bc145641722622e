//! API Routes
//!
//! Configures the Axum router with all cache lab endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_handler, fetch_handler, health_handler, patterns_handler,
    policy_handler, reindex_handler, reset_stats_handler, start_handler, stop_handler,
    test_request_handler, traffic_stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cache = Router::new()
        .route("/fetch/:key", get(fetch_handler))
        .route("/stats", get(cache_stats_handler))
        .route("/clear", post(clear_handler))
        .route("/policy", post(policy_handler))
        .route("/reindex", post(reindex_handler))
        .route("/reset-stats", post(reset_stats_handler));

    let traffic = Router::new()
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/stats", get(traffic_stats_handler))
        .route("/patterns", get(patterns_handler))
        .route("/test-request", post(test_request_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/cache", cache)
        .nest("/traffic", traffic)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
