//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use geo_cache::{
    api::create_router,
    cache::{CacheRegistry, ManualClock},
    AppState, Config,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::from_config(&Config::default()))
}

fn create_app_with_clock() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let caches = CacheRegistry::with_clock(&Config::default(), clock.clone());
    (create_router(AppState::new(caches)), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET / GET Endpoint Tests ==

#[tokio::test]
async fn test_set_then_get() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/caches/deviceData/entries",
        Some(r#"{"key":"device:42:latest","value":{"status":"online","battery":87}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("device:42:latest"));

    let (status, json) = send(&app, "GET", "/caches/deviceData/entries/device:42:latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"]["battery"], 87);
    assert_eq!(json["cache"], "deviceData");
}

#[tokio::test]
async fn test_set_rejects_empty_key() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/caches/global/entries",
        Some(r#"{"key":"","value":1}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_get_expired_entry_is_not_found() {
    let (app, clock) = create_app_with_clock();

    send(
        &app,
        "PUT",
        "/caches/gpsData/entries",
        Some(r#"{"key":"gps:1:24h:50","value":[1,2,3],"ttl_ms":1000}"#),
    )
    .await;

    clock.advance(1000);
    let (status, _) = send(&app, "GET", "/caches/gpsData/entries/gps:1:24h:50", None).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(1);
    let (status, json) = send(&app, "GET", "/caches/gpsData/entries/gps:1:24h:50", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("gps:1:24h:50"));
}

#[tokio::test]
async fn test_unknown_cache_returns_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/caches/l2/entries/anything", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("l2"));
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint() {
    let app = create_test_app();
    send(&app, "PUT", "/caches/global/entries", Some(r#"{"key":"k","value":"v"}"#)).await;

    let (status, _) = send(&app, "DELETE", "/caches/global/entries/k", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/caches/global/entries/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == INVALIDATE Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_cascades_to_dependents() {
    let app = create_test_app();
    send(&app, "PUT", "/caches/global/entries", Some(r#"{"key":"A","value":1}"#)).await;
    send(
        &app,
        "PUT",
        "/caches/global/entries",
        Some(r#"{"key":"B","value":2,"dependencies":["A"]}"#),
    )
    .await;

    let (status, json) = send(&app, "POST", "/caches/global/invalidate", Some(r#"{"key":"A"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["invalidated"], 2);

    let (status, _) = send(&app, "GET", "/caches/global/entries/B", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalidate_by_prefix() {
    let app = create_test_app();
    for key in ["gps:1:24h:50", "gps:1:7d:50", "gps:2:24h:50"] {
        let body = format!(r#"{{"key":"{}","value":[]}}"#, key);
        send(&app, "PUT", "/caches/gpsData/entries", Some(&body)).await;
    }

    let (status, json) = send(
        &app,
        "POST",
        "/caches/gpsData/invalidate",
        Some(r#"{"prefix":"gps:1:"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["invalidated"], 2);

    let (_, stats) = send(&app, "GET", "/stats/gpsData", None).await;
    assert_eq!(stats["size"], 1);
}

#[tokio::test]
async fn test_invalidate_requires_single_target() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/caches/global/invalidate",
        Some(r#"{"key":"a","prefix":"b"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/caches/global/invalidate", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == PRELOADS Endpoint Tests ==

#[tokio::test]
async fn test_preloads_lists_keys_near_expiry() {
    let (app, clock) = create_app_with_clock();
    send(
        &app,
        "PUT",
        "/caches/deviceData/entries",
        Some(r#"{"key":"device:7:latest","value":{},"ttl_ms":1000}"#),
    )
    .await;

    // remaining 900 is not below 1000 * 0.8
    clock.advance(100);
    send(&app, "GET", "/caches/deviceData/entries/device:7:latest", None).await;
    let (_, json) = send(&app, "GET", "/caches/deviceData/preloads", None).await;
    assert_eq!(json["keys"], serde_json::json!([]));

    clock.advance(200);
    send(&app, "GET", "/caches/deviceData/entries/device:7:latest", None).await;
    let (status, json) = send(&app, "GET", "/caches/deviceData/preloads", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["keys"], serde_json::json!(["device:7:latest"]));
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_reports_hit_rate() {
    let app = create_test_app();
    send(&app, "PUT", "/caches/global/entries", Some(r#"{"key":"k","value":1}"#)).await;

    for _ in 0..3 {
        send(&app, "GET", "/caches/global/entries/k", None).await;
    }
    send(&app, "GET", "/caches/global/entries/missing", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["global"]["hits"], 3);
    assert_eq!(json["global"]["misses"], 1);
    assert_eq!(json["global"]["hitRate"], 0.75);
    assert_eq!(json["deviceData"]["maxSize"], 500);
    assert_eq!(json["gpsData"]["size"], 0);
}

// == CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_clear_single_cache() {
    let app = create_test_app();
    send(&app, "PUT", "/caches/global/entries", Some(r#"{"key":"g","value":1}"#)).await;
    send(&app, "PUT", "/caches/gpsData/entries", Some(r#"{"key":"p","value":1}"#)).await;

    let (status, _) = send(&app, "POST", "/caches/global/clear", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(json["global"]["size"], 0);
    assert_eq!(json["gpsData"]["size"], 1);
}

#[tokio::test]
async fn test_clear_all_caches() {
    let app = create_test_app();
    send(&app, "PUT", "/caches/global/entries", Some(r#"{"key":"g","value":1}"#)).await;
    send(&app, "PUT", "/caches/deviceData/entries", Some(r#"{"key":"d","value":1}"#)).await;

    let (status, json) = send(&app, "POST", "/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("all caches"));

    let (_, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(json["global"]["size"], 0);
    assert_eq!(json["deviceData"]["size"], 0);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
