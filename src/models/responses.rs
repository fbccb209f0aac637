//! Response DTOs for the cache monitor API
//!
//! Defines the structure of outgoing HTTP response bodies. Stats endpoints
//! serialize `StatsReport`/`AllStats` directly.

use serde::Serialize;
use serde_json::Value;

/// Response body for `GET /caches/:cache/entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub cache: String,
    pub key: String,
    pub value: Value,
}

impl EntryResponse {
    pub fn new(cache: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            cache: cache.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /caches/:cache/entries`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    pub cache: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(cache: impl Into<String>, key: impl Into<String>) -> Self {
        let cache = cache.into();
        let key = key.into();
        Self {
            message: format!("Key '{}' set in '{}'", key, cache),
            cache,
            key,
        }
    }
}

/// Response body for `DELETE /caches/:cache/entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    pub cache: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(cache: impl Into<String>, key: impl Into<String>) -> Self {
        let cache = cache.into();
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted from '{}'", key, cache),
            cache,
            key,
        }
    }
}

/// Response body for `POST /caches/:cache/invalidate`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub cache: String,
    /// Number of entries (or matching keys, for a prefix) invalidated
    pub invalidated: usize,
}

/// Response body for `GET /caches/:cache/preloads`
#[derive(Debug, Clone, Serialize)]
pub struct PreloadsResponse {
    pub cache: String,
    /// Keys flagged for refresh, sorted
    pub keys: Vec<String>,
}

/// Response body for the clear endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn new(scope: &str) -> Self {
        Self {
            message: format!("Cleared {}", scope),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
