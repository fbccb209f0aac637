//! Advanced Cache Module
//!
//! Shared, async-facing handle over a [`CacheStore`]. One mutex guards the
//! entry map and the access order together, and it is never held across an
//! `.await`: validators and loaders run unlocked.
//!
//! Refresh is cooperative. Reads only flag entries that are close to
//! expiry (see [`AdvancedCache::pending_preloads`]); callers decide when to
//! call [`AdvancedCache::preload`] or [`AdvancedCache::get_or_set`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheOptions, CacheStore, Clock, Lookup, StatsReport, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;

// == Cache Value ==
/// Bounds every cached payload type must satisfy.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

// == Preload Item ==
/// Boxed loader used by [`AdvancedCache::preload_batch`].
pub type Loader<T> = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<T>> + Send>;

/// One unit of work for [`AdvancedCache::preload_batch`].
pub struct PreloadItem<T> {
    pub key: String,
    pub loader: Loader<T>,
    pub options: CacheOptions,
}

impl<T> PreloadItem<T> {
    pub fn new<F, Fut>(key: impl Into<String>, loader: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            key: key.into(),
            loader: Box::new(move || loader().boxed()),
            options: CacheOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CacheOptions) -> Self {
        self.options = options;
        self
    }
}

// == Advanced Cache ==
/// Bounded, TTL-aware, dependency-aware cache handle.
///
/// Cloning is cheap and every clone refers to the same instance.
pub struct AdvancedCache<T> {
    name: Arc<str>,
    store: Arc<Mutex<CacheStore<T>>>,
    clock: Arc<dyn Clock>,
    cleanup_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<T: CacheValue> AdvancedCache<T> {
    // == Constructor ==
    /// Creates a cache on the system clock.
    pub fn new(name: &str, config: CacheConfig) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// Creates a cache on the given clock.
    ///
    /// The periodic cleanup sweep is spawned when called inside a tokio
    /// runtime. Outside one, expired entries are still dropped lazily on
    /// read and by explicit [`cleanup`](Self::cleanup) calls.
    pub fn with_clock(name: &str, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let store = CacheStore::new(config);
        let interval = Duration::from_millis(store.config().cleanup_interval_ms);
        let store = Arc::new(Mutex::new(store));

        let cleanup_task = match tokio::runtime::Handle::try_current() {
            Ok(_) => Some(spawn_cleanup_task(
                name,
                Arc::downgrade(&store),
                clock.clone(),
                interval,
            )),
            Err(_) => {
                debug!("No tokio runtime, cache '{}' runs without background cleanup", name);
                None
            }
        };

        Self {
            name: Arc::from(name),
            store,
            clock,
            cleanup_task: Arc::new(Mutex::new(cleanup_task)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> CacheConfig {
        self.store.lock().config().clone()
    }

    // == Set ==
    /// Stores `value` under `key`, resetting its TTL countdown.
    pub fn set(&self, key: &str, value: T, options: CacheOptions) -> Result<()> {
        let now = self.clock.now_ms();
        self.store.lock().set(key, value, options, now)
    }

    // == Get ==
    /// Returns the cached value if present, unexpired, with all
    /// dependencies cached and accepted by its validator.
    ///
    /// Every other outcome is a miss; validator errors are logged, never
    /// returned.
    pub async fn get(&self, key: &str) -> Option<T> {
        let lookup = self.store.lock().lookup(key, self.clock.now_ms());

        match lookup {
            Lookup::Miss => None,
            Lookup::Hit(value) => Some(value),
            Lookup::NeedsValidation { validator, version } => {
                let valid = match validator().await {
                    Ok(valid) => valid,
                    Err(err) => {
                        warn!("Validator for '{}' in cache '{}' failed: {:#}", key, self.name, err);
                        false
                    }
                };
                let now = self.clock.now_ms();
                self.store.lock().complete_validation(key, version, valid, now)
            }
        }
    }

    // == Get Or Set ==
    /// Read-through: returns the cached value, or awaits `loader`, caches
    /// its result and returns it.
    ///
    /// Loader errors are returned unchanged and nothing is cached.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        loader: F,
        options: CacheOptions,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<CacheError>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = loader().await?;
        self.set(key, value.clone(), options)?;
        Ok(value)
    }

    // == Preload ==
    /// Loads and caches `key` on a best-effort basis.
    ///
    /// Failures are logged and swallowed. Either way the key leaves the
    /// pending-preload set so it can be flagged again. Returns whether the
    /// value was cached.
    pub async fn preload<F, Fut, E>(&self, key: &str, loader: F, options: CacheOptions) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        let cached = match loader().await {
            Ok(value) => match self.set(key, value, options) {
                Ok(()) => true,
                Err(err) => {
                    warn!("Preload of '{}' into cache '{}' not stored: {}", key, self.name, err);
                    false
                }
            },
            Err(err) => {
                warn!("Preload of '{}' into cache '{}' failed: {}", key, self.name, err);
                false
            }
        };

        self.store.lock().finish_preload(key, cached);
        cached
    }

    /// Runs every preload concurrently. One item failing does not affect
    /// the others. Returns how many were cached.
    pub async fn preload_batch(&self, items: Vec<PreloadItem<T>>) -> usize {
        let total = items.len();
        let results = join_all(items.into_iter().map(|item| async move {
            self.preload(&item.key, item.loader, item.options).await
        }))
        .await;

        let cached = results.into_iter().filter(|ok| *ok).count();
        debug!("Cache '{}' preloaded {}/{} entries", self.name, cached, total);
        cached
    }

    // == Update ==
    /// Replaces the value of an existing entry without resetting its TTL.
    /// Returns false if `key` is not cached.
    pub fn update(&self, key: &str, value: T) -> bool {
        let now = self.clock.now_ms();
        self.store.lock().update(key, value, now)
    }

    // == Delete ==
    /// Removes `key`. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    // == Invalidate ==
    /// Removes `key` and everything that depends on it, transitively.
    /// Returns the number of entries removed.
    pub fn invalidate(&self, key: &str) -> usize {
        self.store.lock().invalidate(key)
    }

    /// Invalidates every key accepted by `matcher`. Returns the number of
    /// matching keys invalidated.
    pub fn invalidate_pattern<F>(&self, matcher: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.store.lock().invalidate_matching(matcher)
    }

    /// Invalidates every key starting with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.invalidate_pattern(|key| key.starts_with(prefix))
    }

    // == Cleanup ==
    /// Removes every expired entry now. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now_ms();
        self.store.lock().cleanup_expired(now)
    }

    // == Stats ==
    pub fn stats(&self) -> StatsReport {
        self.store.lock().stats()
    }

    /// Keys whose last read found them close to expiry.
    pub fn pending_preloads(&self) -> Vec<String> {
        self.store.lock().pending_preloads()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().contains_key(key)
    }

    // == Clear ==
    /// Drops all entries and pending preloads. Counters are kept.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    // == Destroy ==
    /// Stops the cleanup sweep and clears the cache. Later writes fail with
    /// [`CacheError::Destroyed`] and reads miss. Safe to call repeatedly.
    pub fn destroy(&self) {
        if let Some(handle) = self.cleanup_task.lock().take() {
            handle.abort();
            info!("Cache '{}' destroyed, cleanup task stopped", self.name);
        }
        self.store.lock().destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.store.lock().is_destroyed()
    }
}

impl<T> Clone for AdvancedCache<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            cleanup_task: self.cleanup_task.clone(),
        }
    }
}

impl<T> fmt::Debug for AdvancedCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvancedCache")
            .field("name", &self.name)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
