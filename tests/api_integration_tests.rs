//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles through the router, including eviction
//! scenarios driven purely over HTTP and a short live load run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cache_lab::{
    api::create_router,
    cache::{CacheStore, FetchService, PolicyKind},
    upstream::{ContentSource, SyntheticContentSource},
    AppState, LabError,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

struct FailingSource;

#[async_trait]
impl ContentSource for FailingSource {
    async fn resolve(&self, key: &str) -> cache_lab::Result<String> {
        Err(LabError::UpstreamFetch(format!("storage has no '{}'", key)))
    }
}

fn create_state(max_size: usize, policy: PolicyKind) -> AppState {
    let service = FetchService::new(
        CacheStore::new(max_size, Duration::from_secs(300), policy),
        Arc::new(SyntheticContentSource::default()),
    );
    AppState::for_cache(service)
}

fn create_test_app(max_size: usize, policy: PolicyKind) -> Router {
    create_router(create_state(max_size, policy))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post(app: &Router, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method("POST").uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn fetch(app: &Router, key: &str) -> Value {
    let (status, json) = get(app, &format!("/cache/fetch/{}", key)).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn is_cached(app: &Router, key: &str) -> bool {
    fetch(app, key).await["cache_hit"] == true
}

// == Fetch Endpoint Tests ==

#[tokio::test]
async fn test_fetch_miss_then_hit() {
    let app = create_test_app(10, PolicyKind::Lru);

    let first = fetch(&app, "42").await;
    assert_eq!(first["key"], "42");
    assert_eq!(first["cache_hit"], false);

    let second = fetch(&app, "42").await;
    assert_eq!(second["cache_hit"], true);
    assert_eq!(first["value"], second["value"]);

    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_requests"], 2);
    assert_eq!(stats["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_fetch_upstream_failure_is_bad_gateway() {
    let service = FetchService::new(
        CacheStore::new(10, Duration::from_secs(300), PolicyKind::Lru),
        Arc::new(FailingSource),
    );
    let app = create_router(AppState::for_cache(service));

    let (status, json) = get(&app, "/cache/fetch/7").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("'7'"));

    // The miss is still counted and nothing is cached
    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["current_size"], 0);
}

// == Eviction Scenarios ==

#[tokio::test]
async fn test_fifo_scenario_over_http() {
    let app = create_test_app(3, PolicyKind::Fifo);

    for key in ["A", "B", "C"] {
        fetch(&app, key).await;
    }
    // Accessing A does not save it under FIFO
    assert!(is_cached(&app, "A").await);
    fetch(&app, "D").await;

    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["current_size"], 3);
    assert_eq!(stats["evictions"], 1);

    for key in ["B", "C", "D"] {
        assert!(is_cached(&app, key).await, "{} should be cached", key);
    }
    assert!(!is_cached(&app, "A").await);
}

#[tokio::test]
async fn test_lru_scenario_over_http() {
    let app = create_test_app(2, PolicyKind::Lru);

    fetch(&app, "A").await;
    fetch(&app, "B").await;
    assert!(is_cached(&app, "A").await);
    fetch(&app, "C").await;

    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["current_size"], 2);
    assert_eq!(stats["evictions"], 1);

    assert!(is_cached(&app, "A").await);
    assert!(is_cached(&app, "C").await);
}

#[tokio::test]
async fn test_policy_switch_and_reindex() {
    let app = create_test_app(3, PolicyKind::Fifo);

    for key in ["A", "B", "C"] {
        fetch(&app, key).await;
    }
    // A becomes the most frequently used entry
    for _ in 0..3 {
        assert!(is_cached(&app, "A").await);
    }

    let (status, json) = post(&app, "/cache/policy", Some(r#"{"policy":"lfu","reindex":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["policy"], "lfu");
    assert_eq!(json["previous"], "fifo");
    assert_eq!(json["reindexed"], true);

    fetch(&app, "D").await;

    // Under rebuilt LFU scores, A survives even though it was inserted first
    assert!(is_cached(&app, "A").await);
    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["policy"], "lfu");
    assert_eq!(stats["current_size"], 3);
}

#[tokio::test]
async fn test_unknown_policy_is_bad_request() {
    let app = create_test_app(3, PolicyKind::Lru);

    let (status, json) = post(&app, "/cache/policy", Some(r#"{"policy":"random"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("random"));

    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["policy"], "lru");
}

#[tokio::test]
async fn test_clear_keeps_counters_and_reset_zeroes_them() {
    let app = create_test_app(10, PolicyKind::Lru);
    fetch(&app, "1").await;
    fetch(&app, "1").await;

    let (status, json) = post(&app, "/cache/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["current_size"], 0);
    assert_eq!(stats["total_requests"], 2);

    let (status, _) = post(&app, "/cache/reset-stats", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = get(&app, "/cache/stats").await;
    assert_eq!(stats["total_requests"], 0);
    assert_eq!(stats["hit_rate"], 0.0);
}

// == Traffic Endpoint Tests ==

#[tokio::test]
async fn test_traffic_stats_idle() {
    let app = create_test_app(10, PolicyKind::Lru);

    let (status, json) = get(&app, "/traffic/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "idle");
    assert_eq!(json["sent"], 0);
}

#[tokio::test]
async fn test_unknown_distribution_is_bad_request() {
    let app = create_test_app(10, PolicyKind::Lru);

    let (status, json) = post(&app, "/traffic/start", Some(r#"{"distribution":"pareto"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("pareto"));
}

#[tokio::test]
async fn test_invalid_rate_is_bad_request() {
    let app = create_test_app(10, PolicyKind::Lru);

    let (status, _) = post(&app, "/traffic/start", Some(r#"{"rate":-2.0}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_short_run_completes() {
    let state = create_state(100, PolicyKind::Lru);
    let app = create_router(state.clone());

    let (status, json) = post(
        &app,
        "/traffic/start",
        Some(r#"{"distribution":"uniform","rate":20.0,"duration":0.5}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_scheduled"], 9);

    // A second start while running is refused
    let (status, json) = post(&app, "/traffic/start", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("already running"));

    let mut stats = Value::Null;
    for _ in 0..100 {
        (_, stats) = get(&app, "/traffic/stats").await;
        if stats["status"] == "completed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(stats["status"], "completed");
    assert_eq!(stats["sent"], 9);
    assert_eq!(stats["succeeded"], 9);
    assert_eq!(stats["success_rate"], 1.0);

    // Every request of the run went through the cache
    let (_, cache) = get(&app, "/cache/stats").await;
    assert_eq!(cache["total_requests"], 9);
}

#[tokio::test]
async fn test_failed_requests_are_counted_in_runs() {
    let service = FetchService::new(
        CacheStore::new(10, Duration::from_secs(300), PolicyKind::Lru),
        Arc::new(FailingSource),
    );
    let state = AppState::for_cache(service);
    let app = create_router(state.clone());

    let (status, _) = post(
        &app,
        "/traffic/start",
        Some(r#"{"distribution":"uniform","rate":20.0,"duration":0.3}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..100 {
        if state.traffic.stats().status == cache_lab::traffic::RunStatus::Completed {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let stats = state.traffic.stats();
    assert_eq!(stats.sent, 5);
    assert_eq!(stats.failed, 5);
    assert_eq!(stats.succeeded, 0);
    assert_eq!(stats.success_rate, 0.0);
}

#[tokio::test]
async fn test_stop_when_idle() {
    let app = create_test_app(10, PolicyKind::Lru);

    let (status, json) = post(&app, "/traffic/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "idle");
}

#[tokio::test]
async fn test_test_request_with_and_without_key() {
    let app = create_test_app(10, PolicyKind::Lru);

    let (status, json) = post(&app, "/traffic/test-request", Some(r#"{"key":"5"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "5");
    assert_eq!(json["cache_hit"], false);

    let (status, json) = post(&app, "/traffic/test-request", Some(r#"{"key":"5"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cache_hit"], true);

    let (status, json) = post(&app, "/traffic/test-request", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["key"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_patterns_list() {
    let app = create_test_app(10, PolicyKind::Lru);

    let (status, json) = get(&app, "/traffic/patterns").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Light Load", "Normal Load", "Burst Load", "Steady Load"]);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(10, PolicyKind::Lru);

    let (status, json) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
