//! Cache Module
//!
//! In-memory caching with TTL expiration, priority-aware LRU eviction,
//! dependency invalidation, payload compression and cooperative preloading.

mod advanced;
mod clock;
mod entry;
pub mod keys;
mod lru;
mod payload;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use advanced::{AdvancedCache, CacheValue, Loader, PreloadItem};
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, CacheOptions, Validator, DEFAULT_PRIORITY};
pub use lru::LruTracker;
pub use payload::{Payload, PayloadError};
pub use registry::{AllStats, CacheRegistry, CACHE_NAMES};
pub use stats::{CacheStats, StatsReport};
pub use store::{CacheStore, Lookup};
