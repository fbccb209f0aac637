//! API Handlers
//!
//! HTTP request handlers for the cache monitor endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{AllStats, CacheRegistry, StatsReport};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, EntryResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, InvalidateTarget, PreloadsResponse, SetEntryRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// The registry is a set of cheap-to-clone handles; each cache does its
/// own locking.
#[derive(Clone)]
pub struct AppState {
    pub caches: CacheRegistry<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(caches: CacheRegistry<Value>) -> Self {
        Self { caches }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Must be called inside a tokio runtime so the cleanup sweeps start.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheRegistry::new(config))
    }
}

/// Handler for PUT /caches/:cache/entries
pub async fn set_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
    Json(req): Json<SetEntryRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.caches.by_name(&cache_name)?;
    let (key, value, options) = req.into_parts();
    cache.set(&key, value, options)?;

    Ok(Json(SetResponse::new(cache.name(), key)))
}

/// Handler for GET /caches/:cache/entries/:key
///
/// Misses, expired and invalidated entries all answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((cache_name, key)): Path<(String, String)>,
) -> Result<Json<EntryResponse>> {
    let cache = state.caches.by_name(&cache_name)?;
    let value = cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(EntryResponse::new(cache.name(), key, value)))
}

/// Handler for DELETE /caches/:cache/entries/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((cache_name, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let cache = state.caches.by_name(&cache_name)?;
    if !cache.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(cache.name(), key)))
}

/// Handler for POST /caches/:cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let target = req.target().map_err(CacheError::InvalidRequest)?;
    let cache = state.caches.by_name(&cache_name)?;

    let invalidated = match target {
        InvalidateTarget::Key(key) => cache.invalidate(&key),
        InvalidateTarget::Prefix(prefix) => cache.invalidate_prefix(&prefix),
    };

    Ok(Json(InvalidateResponse {
        cache: cache.name().to_string(),
        invalidated,
    }))
}

/// Handler for GET /caches/:cache/preloads
pub async fn preloads_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<PreloadsResponse>> {
    let cache = state.caches.by_name(&cache_name)?;

    Ok(Json(PreloadsResponse {
        cache: cache.name().to_string(),
        keys: cache.pending_preloads(),
    }))
}

/// Handler for POST /caches/:cache/clear
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cache = state.caches.by_name(&cache_name)?;
    cache.clear();

    Ok(Json(ClearResponse::new(cache.name())))
}

/// Handler for POST /clear
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.caches.clear_all();
    Json(ClearResponse::new("all caches"))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<AllStats> {
    Json(state.caches.all_stats())
}

/// Handler for GET /stats/:cache
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<StatsReport>> {
    let cache = state.caches.by_name(&cache_name)?;
    Ok(Json(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::from_config(&Config::default())
    }

    fn set_request(key: &str, value: Value) -> SetEntryRequest {
        SetEntryRequest {
            key: key.to_string(),
            value,
            ttl_ms: None,
            priority: None,
            dependencies: vec![],
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = set_request("device:1:latest", json!({"status": "online"}));
        let result = set_handler(State(state.clone()), Path("deviceData".to_string()), Json(req)).await;
        assert!(result.is_ok());

        let result = get_handler(
            State(state.clone()),
            Path(("deviceData".to_string(), "device:1:latest".to_string())),
        )
        .await;
        let response = result.unwrap();
        assert_eq!(response.value, json!({"status": "online"}));
        assert_eq!(response.cache, "deviceData");
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path(("global".to_string(), "nonexistent".to_string()))).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_cache() {
        let state = test_state();

        let result = cache_stats_handler(State(state), Path("l2".to_string())).await;
        assert!(matches!(result, Err(CacheError::UnknownCache(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        set_handler(State(state.clone()), Path("global".to_string()), Json(set_request("k", json!(1))))
            .await
            .unwrap();

        let path = || Path(("global".to_string(), "k".to_string()));
        assert!(delete_handler(State(state.clone()), path()).await.is_ok());
        assert!(matches!(
            delete_handler(State(state), path()).await,
            Err(CacheError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_handler_cascades() {
        let state = test_state();
        let gps = state.caches.gps_data();
        gps.set("gps:1:24h:50", json!([1]), Default::default()).unwrap();
        gps.set("gps:1:7d:50", json!([2]), Default::default()).unwrap();

        let req = InvalidateRequest {
            key: None,
            prefix: Some("gps:1:".to_string()),
        };
        let response = invalidate_handler(State(state.clone()), Path("gpsData".to_string()), Json(req))
            .await
            .unwrap();

        assert_eq!(response.invalidated, 2);
        assert!(gps.is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.global.hits, 0);
        assert_eq!(response.device_data.max_size, 500);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let req = set_request("", json!("value"));
        let result = set_handler(State(state), Path("global".to_string()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
