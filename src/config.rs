//! Configuration Module
//!
//! Cache instance profiles and server settings, loaded from environment
//! variables on top of built-in presets.

use std::env;
use std::str::FromStr;

use tracing::warn;

// == Cache Config ==
/// Sizing and timing profile for one cache instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Background cleanup sweep period in milliseconds
    pub cleanup_interval_ms: u64,
    /// A read flags the entry for refresh once its remaining TTL drops below `ttl * preload_factor`
    pub preload_factor: f64,
    /// Serialized size above which payloads are stored compressed
    pub compression_threshold_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl_ms: 5 * 60 * 1000,
            cleanup_interval_ms: 60 * 1000,
            preload_factor: 0.8,
            compression_threshold_bytes: 50 * 1024,
        }
    }
}

impl CacheConfig {
    /// Profile for the general-purpose cache (aggregations and misc lookups).
    pub fn global() -> Self {
        Self {
            max_entries: 2000,
            default_ttl_ms: 10 * 60 * 1000,
            cleanup_interval_ms: 2 * 60 * 1000,
            preload_factor: 0.75,
            compression_threshold_bytes: 100 * 1024,
        }
    }

    /// Profile for per-device status data.
    pub fn device_data() -> Self {
        Self {
            max_entries: 500,
            ..Self::default()
        }
    }

    /// Profile for GPS baseline series.
    pub fn gps_data() -> Self {
        Self {
            max_entries: 1000,
            default_ttl_ms: 3 * 60 * 1000,
            cleanup_interval_ms: 30 * 1000,
            preload_factor: 0.9,
            compression_threshold_bytes: 25 * 1024,
        }
    }

    /// Applies `<PREFIX>MAX_ENTRIES`, `<PREFIX>DEFAULT_TTL_MS`,
    /// `<PREFIX>CLEANUP_INTERVAL_MS`, `<PREFIX>PRELOAD_FACTOR` and
    /// `<PREFIX>COMPRESSION_THRESHOLD` overrides to `self`.
    ///
    /// Unparseable or out-of-range values keep the preset.
    pub fn with_env_overrides(mut self, prefix: &str) -> Self {
        if let Some(v) = env_parse::<usize>(prefix, "MAX_ENTRIES").filter(|v| *v > 0) {
            self.max_entries = v;
        }
        if let Some(v) = env_parse::<u64>(prefix, "DEFAULT_TTL_MS").filter(|v| *v > 0) {
            self.default_ttl_ms = v;
        }
        if let Some(v) = env_parse::<u64>(prefix, "CLEANUP_INTERVAL_MS").filter(|v| *v > 0) {
            self.cleanup_interval_ms = v;
        }
        if let Some(v) = env_parse::<f64>(prefix, "PRELOAD_FACTOR").filter(|v| *v > 0.0 && *v < 1.0) {
            self.preload_factor = v;
        }
        if let Some(v) = env_parse::<usize>(prefix, "COMPRESSION_THRESHOLD") {
            self.compression_threshold_bytes = v;
        }
        self
    }

    /// Returns `self` with every out-of-range field replaced by the
    /// [`Default`] value: zero `max_entries`, `default_ttl_ms` or
    /// `cleanup_interval_ms`, and a `preload_factor` outside (0, 1).
    pub fn validated(mut self) -> Self {
        let fallback = Self::default();

        if self.max_entries == 0 {
            warn!("max_entries must be positive, using {}", fallback.max_entries);
            self.max_entries = fallback.max_entries;
        }
        if self.default_ttl_ms == 0 {
            warn!("default_ttl_ms must be positive, using {}", fallback.default_ttl_ms);
            self.default_ttl_ms = fallback.default_ttl_ms;
        }
        if self.cleanup_interval_ms == 0 {
            warn!("cleanup_interval_ms must be positive, using {}", fallback.cleanup_interval_ms);
            self.cleanup_interval_ms = fallback.cleanup_interval_ms;
        }
        if !(self.preload_factor > 0.0 && self.preload_factor < 1.0) {
            warn!(
                "preload_factor {} is outside (0, 1), using {}",
                self.preload_factor, fallback.preload_factor
            );
            self.preload_factor = fallback.preload_factor;
        }
        self
    }
}

fn env_parse<T: FromStr>(prefix: &str, name: &str) -> Option<T> {
    env::var(format!("{prefix}{name}"))
        .ok()
        .and_then(|v| v.parse().ok())
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Profile of the general-purpose cache
    pub global: CacheConfig,
    /// Profile of the device data cache
    pub device_data: CacheConfig,
    /// Profile of the GPS data cache
    pub gps_data: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `GLOBAL_CACHE_*`, `DEVICE_CACHE_*`, `GPS_CACHE_*` - per-domain
    ///   overrides, see [`CacheConfig::with_env_overrides`]
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            global: CacheConfig::global().with_env_overrides("GLOBAL_CACHE_"),
            device_data: CacheConfig::device_data().with_env_overrides("DEVICE_CACHE_"),
            gps_data: CacheConfig::gps_data().with_env_overrides("GPS_CACHE_"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            global: CacheConfig::global(),
            device_data: CacheConfig::device_data(),
            gps_data: CacheConfig::gps_data(),
        }
    }
}
