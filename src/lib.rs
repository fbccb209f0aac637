//! Geo Cache - Expiring caches for the GPS deformation monitoring dashboard
//!
//! Provides TTL-bound, capacity-bounded caches with priority-aware LRU
//! eviction, dependency-cascading invalidation, optional validators,
//! transparent compression of large payloads and hit/miss statistics.
//!
//! The three cache domains used by the dashboard (`global`, `deviceData`,
//! `gpsData`) are owned by a [`CacheRegistry`] built by the caller.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{AdvancedCache, CacheOptions, CacheRegistry};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
