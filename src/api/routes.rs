//! API Routes
//!
//! Configures the Axum router with all cache monitor endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_all_handler, clear_handler, delete_handler, get_handler,
    health_handler, invalidate_handler, preloads_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Stats of every cache
/// - `GET /stats/:cache` - Stats of one cache
/// - `PUT /caches/:cache/entries` - Store a value
/// - `GET /caches/:cache/entries/:key` - Read a value
/// - `DELETE /caches/:cache/entries/:key` - Delete a key
/// - `POST /caches/:cache/invalidate` - Invalidate a key (cascading) or a prefix
/// - `GET /caches/:cache/preloads` - Keys flagged for refresh
/// - `POST /caches/:cache/clear` - Clear one cache
/// - `POST /clear` - Clear every cache
///
/// # Middleware
/// - CORS: Allows any origin (the dashboard is served from another host)
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/:cache", get(cache_stats_handler))
        .route("/caches/:cache/entries", put(set_handler))
        .route(
            "/caches/:cache/entries/:key",
            get(get_handler).delete(delete_handler),
        )
        .route("/caches/:cache/invalidate", post(invalidate_handler))
        .route("/caches/:cache/preloads", get(preloads_handler))
        .route("/caches/:cache/clear", post(clear_handler))
        .route("/clear", post(clear_all_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::from_config(&Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoints() {
        let app = create_test_app();

        for uri in ["/stats", "/stats/global", "/stats/deviceData", "/stats/gpsData"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/caches/global/entries")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"test","value":{"hello":"world"}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/caches/global/entries/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_cache_is_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/stats/l2").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
