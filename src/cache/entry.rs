//! Cache Entry Module
//!
//! Defines individual cache entries and the per-write options that shape them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::cache::Payload;

/// Priority given to entries written without an explicit one.
pub const DEFAULT_PRIORITY: u32 = 1;

// == Validator ==
/// Asynchronous freshness check attached to an entry.
///
/// Resolving to `Ok(false)` or `Err(_)` makes the entry invalid on read.
pub type Validator = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<bool>> + Send + Sync>;

// == Cache Options ==
/// Per-write options for `set`, `get_or_set` and `preload`.
#[derive(Clone, Default)]
pub struct CacheOptions {
    /// Entry TTL in milliseconds; `None` or `Some(0)` uses the instance default
    pub ttl_ms: Option<u64>,
    /// Eviction tie-breaker, lower is evicted first; defaults to 1
    pub priority: Option<u32>,
    /// Keys that must stay cached for this entry to remain valid
    pub dependencies: Vec<String>,
    /// Optional freshness check run on every read
    pub validator: Option<Validator>,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn depends_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Attaches an async validator.
    pub fn validator<F, Fut>(mut self, validator: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.validator = Some(Arc::new(move || validator().boxed()));
        self
    }
}

impl fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("ttl_ms", &self.ttl_ms)
            .field("priority", &self.priority)
            .field("dependencies", &self.dependencies)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
pub struct CacheEntry<T> {
    /// The stored value, possibly compressed
    pub payload: Payload<T>,
    /// Time of the last full write (Unix milliseconds)
    pub created_at: u64,
    /// Time-to-live measured from `created_at`
    pub ttl_ms: u64,
    /// Number of successful reads
    pub access_count: u64,
    /// Time of the last successful read or write (Unix milliseconds)
    pub last_accessed_at: u64,
    pub priority: u32,
    pub dependencies: Vec<String>,
    pub validator: Option<Validator>,
    /// Bumped on every write so a read that awaited a validator can tell
    /// whether it is still looking at the same entry
    pub version: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a fresh entry written at `now`.
    pub fn new(payload: Payload<T>, now: u64, ttl_ms: u64, options: CacheOptions, version: u64) -> Self {
        Self {
            payload,
            created_at: now,
            ttl_ms,
            access_count: 0,
            last_accessed_at: now,
            priority: options.priority.unwrap_or(DEFAULT_PRIORITY),
            dependencies: options.dependencies,
            validator: options.validator,
            version,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry aged exactly `ttl_ms` is still live; it
    /// expires once its age is strictly greater than the TTL.
    pub fn is_expired(&self, now: u64) -> bool {
        self.age_ms(now) > self.ttl_ms
    }

    /// Milliseconds since the last full write.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms(now))
    }

    /// True once less than `preload_factor` of the TTL remains.
    pub fn is_due_for_preload(&self, now: u64, preload_factor: f64) -> bool {
        (self.ttl_remaining_ms(now) as f64) < self.ttl_ms as f64 * preload_factor
    }

    /// Records a successful read at `now`.
    pub fn record_access(&mut self, now: u64) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }
}

impl<T> fmt::Debug for CacheEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("compressed", &self.payload.is_compressed())
            .field("created_at", &self.created_at)
            .field("ttl_ms", &self.ttl_ms)
            .field("access_count", &self.access_count)
            .field("last_accessed_at", &self.last_accessed_at)
            .field("priority", &self.priority)
            .field("dependencies", &self.dependencies)
            .field("validator", &self.validator.is_some())
            .field("version", &self.version)
            .finish()
    }
}
