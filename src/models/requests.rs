//! Request DTOs for the cache monitor API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheOptions;

/// Request body for `PUT /caches/:cache/entries`
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl_ms`: Optional TTL in milliseconds (uses the cache default if not specified)
/// - `priority`: Optional eviction priority (default 1)
/// - `dependencies`: Keys this entry depends on
#[derive(Debug, Clone, Deserialize)]
pub struct SetEntryRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl SetEntryRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.dependencies.iter().any(String::is_empty) {
            return Some("Dependency keys cannot be empty".to_string());
        }
        None
    }

    /// Splits the request into key, value and write options.
    pub fn into_parts(self) -> (String, Value, CacheOptions) {
        let options = CacheOptions {
            ttl_ms: self.ttl_ms,
            priority: self.priority,
            dependencies: self.dependencies,
            validator: None,
        };
        (self.key, self.value, options)
    }
}

/// Request body for `POST /caches/:cache/invalidate`
///
/// Exactly one of `key` (cascading invalidation of one key) or `prefix`
/// (every key starting with it) must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// What an [`InvalidateRequest`] targets.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidateTarget {
    Key(String),
    Prefix(String),
}

impl InvalidateRequest {
    /// Resolves the request into a single target, or an error message.
    pub fn target(self) -> Result<InvalidateTarget, String> {
        match (self.key, self.prefix) {
            (Some(key), None) if !key.is_empty() => Ok(InvalidateTarget::Key(key)),
            (None, Some(prefix)) if !prefix.is_empty() => Ok(InvalidateTarget::Prefix(prefix)),
            (Some(_), Some(_)) => Err("Specify either key or prefix, not both".to_string()),
            _ => Err("A non-empty key or prefix is required".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "device:1:latest", "value": {"status": "online"}}"#;
        let req: SetEntryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "device:1:latest");
        assert_eq!(req.value, json!({"status": "online"}));
        assert!(req.ttl_ms.is_none());
        assert!(req.dependencies.is_empty());
    }

    #[test]
    fn test_set_request_into_parts() {
        let json = r#"{"key": "k", "value": 1, "ttl_ms": 60000, "priority": 3, "dependencies": ["base"]}"#;
        let req: SetEntryRequest = serde_json::from_str(json).unwrap();

        let (key, value, options) = req.into_parts();
        assert_eq!(key, "k");
        assert_eq!(value, json!(1));
        assert_eq!(options.ttl_ms, Some(60_000));
        assert_eq!(options.priority, Some(3));
        assert_eq!(options.dependencies, vec!["base".to_string()]);
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetEntryRequest {
            key: "".to_string(),
            value: json!("test"),
            ttl_ms: None,
            priority: None,
            dependencies: vec![],
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_empty_dependency() {
        let req = SetEntryRequest {
            key: "k".to_string(),
            value: json!("test"),
            ttl_ms: None,
            priority: None,
            dependencies: vec!["".to_string()],
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_invalidate_target() {
        let by_key: InvalidateRequest = serde_json::from_str(r#"{"key": "base"}"#).unwrap();
        assert_eq!(by_key.target(), Ok(InvalidateTarget::Key("base".to_string())));

        let by_prefix: InvalidateRequest = serde_json::from_str(r#"{"prefix": "gps:"}"#).unwrap();
        assert_eq!(by_prefix.target(), Ok(InvalidateTarget::Prefix("gps:".to_string())));

        let both: InvalidateRequest = serde_json::from_str(r#"{"key": "a", "prefix": "b"}"#).unwrap();
        assert!(both.target().is_err());

        let neither: InvalidateRequest = serde_json::from_str("{}").unwrap();
        assert!(neither.target().is_err());
    }
}
