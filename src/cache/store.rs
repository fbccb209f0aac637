//! Cache Store Module
//!
//! Synchronous cache engine: HashMap storage kept in lock-step with LRU
//! tracking, TTL expiry, dependency invalidation and priority eviction.
//!
//! Every method takes the current time explicitly; `AdvancedCache` owns the
//! clock and the lock around this type.

use std::collections::{HashMap, HashSet};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheOptions, CacheStats, LruTracker, Payload, StatsReport, Validator};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Lookup ==
/// Outcome of the synchronous part of a read.
pub enum Lookup<T> {
    /// Absent, expired or invalid. Already counted as a miss.
    Miss,
    /// Live entry with no validator. Already counted as a hit.
    Hit(T),
    /// Live entry whose validator must be awaited before the read completes.
    NeedsValidation { validator: Validator, version: u64 },
}

// == Cache Store ==
/// Main cache storage with priority/LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// LRU access tracker, holds exactly the keys of `entries`
    lru: LruTracker,
    /// Keys flagged for background refresh
    pending_preloads: HashSet<String>,
    /// Performance statistics
    stats: CacheStats,
    config: CacheConfig,
    next_version: u64,
    destroyed: bool,
}

impl<T> CacheStore<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Creates an empty store sized by `config`, after replacing any
    /// out-of-range field (see [`CacheConfig::validated`]).
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            pending_preloads: HashSet::new(),
            stats: CacheStats::new(),
            config: config.validated(),
            next_version: 0,
            destroyed: false,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value under `key`, replacing any previous entry.
    ///
    /// A new key arriving at capacity evicts exactly one entry first.
    /// Overwrites never evict.
    pub fn set(&mut self, key: &str, value: T, options: CacheOptions, now: u64) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }
        if self.destroyed {
            return Err(CacheError::Destroyed);
        }

        let payload = Payload::encode(value, self.config.compression_threshold_bytes);
        if payload.is_compressed() {
            self.stats.record_compression();
        }

        if !self.entries.contains_key(key) && self.entries.len() >= self.config.max_entries {
            self.evict_one();
        }

        let ttl_ms = options
            .ttl_ms
            .filter(|ttl| *ttl > 0)
            .unwrap_or(self.config.default_ttl_ms);
        self.next_version += 1;

        let entry = CacheEntry::new(payload, now, ttl_ms, options, self.next_version);
        self.entries.insert(key.to_string(), entry);
        self.lru.touch(key);

        Ok(())
    }

    // == Lookup ==
    /// Runs the expiry and dependency checks for a read and, if no
    /// validator is attached, completes it.
    pub fn lookup(&mut self, key: &str, now: u64) -> Lookup<T> {
        if !self.check_live(key, now) {
            return Lookup::Miss;
        }

        let validator = self
            .entries
            .get(key)
            .and_then(|entry| entry.validator.clone().map(|v| (v, entry.version)));

        match validator {
            Some((validator, version)) => Lookup::NeedsValidation { validator, version },
            None => match self.finish_hit(key, now) {
                Some(value) => Lookup::Hit(value),
                None => Lookup::Miss,
            },
        }
    }

    // == Complete Validation ==
    /// Finishes a read whose validator resolved to `valid`.
    ///
    /// If the entry was rewritten or removed while the validator ran, the
    /// read is a miss.
    pub fn complete_validation(&mut self, key: &str, version: u64, valid: bool, now: u64) -> Option<T> {
        let same_entry = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.version == version);

        if !same_entry {
            self.stats.record_miss();
            return None;
        }

        if !valid {
            self.invalidate(key);
            self.stats.record_miss();
            return None;
        }

        if !self.check_live(key, now) {
            return None;
        }

        self.finish_hit(key, now)
    }

    /// Presence, expiry and dependency checks. Counts the miss and removes
    /// the entry when it fails.
    fn check_live(&mut self, key: &str, now: u64) -> bool {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return false;
        };

        if entry.is_expired(now) {
            self.delete(key);
            self.stats.record_miss();
            return false;
        }

        let broken_dependency = entry
            .dependencies
            .iter()
            .any(|dep| !self.entries.contains_key(dep));
        if broken_dependency {
            debug!("Entry '{}' lost a dependency, invalidating", key);
            self.invalidate(key);
            self.stats.record_miss();
            return false;
        }

        true
    }

    /// Decodes the value and records the access.
    fn finish_hit(&mut self, key: &str, now: u64) -> Option<T> {
        let preload_factor = self.config.preload_factor;
        let entry = self.entries.get_mut(key)?;

        let value = match entry.payload.decode() {
            Ok(value) => value,
            Err(err) => {
                warn!("Dropping unreadable compressed entry '{}': {}", key, err);
                self.invalidate(key);
                self.stats.record_miss();
                return None;
            }
        };

        entry.record_access(now);
        let due = entry.is_due_for_preload(now, preload_factor);

        self.lru.touch(key);
        self.stats.record_hit();

        if due && self.pending_preloads.insert(key.to_string()) {
            debug!("Entry '{}' flagged for preload", key);
        }

        Some(value)
    }

    // == Update ==
    /// Replaces the value of an existing entry in place.
    ///
    /// TTL, priority, dependencies and validator are kept, and `created_at`
    /// is not reset, so the entry expires when it would have anyway.
    pub fn update(&mut self, key: &str, value: T, now: u64) -> bool {
        let threshold = self.config.compression_threshold_bytes;
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };

        entry.payload = Payload::encode(value, threshold);
        entry.last_accessed_at = now;
        self.lru.touch(key);
        true
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.pending_preloads.remove(key);
            true
        } else {
            false
        }
    }

    // == Invalidate ==
    /// Removes `key` and, transitively, every entry depending on it.
    ///
    /// Returns the number of entries removed. Dependency cycles terminate
    /// because each key is visited once.
    pub fn invalidate(&mut self, key: &str) -> usize {
        let mut removed = 0;
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue = vec![key.to_string()];

        while let Some(current) = queue.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if self.delete(&current) {
                removed += 1;
            }
            queue.extend(
                self.entries
                    .iter()
                    .filter(|(_, entry)| entry.dependencies.iter().any(|dep| *dep == current))
                    .map(|(dependent, _)| dependent.clone()),
            );
        }

        removed
    }

    // == Invalidate Matching ==
    /// Invalidates every key accepted by `matcher`.
    ///
    /// Returns how many matching keys were still present when their turn
    /// came; keys already removed by an earlier cascade are not counted.
    pub fn invalidate_matching<F>(&mut self, matcher: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| matcher(key))
            .cloned()
            .collect();

        let mut count = 0;
        for key in matching {
            if self.entries.contains_key(&key) {
                self.invalidate(&key);
                count += 1;
            }
        }
        count
    }

    // == Eviction ==
    /// Evicts the entry with the lowest priority, oldest access time first
    /// among equals, then least recently used among exact ties.
    fn evict_one(&mut self) -> Option<String> {
        let victim = self
            .lru
            .iter_oldest_first()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .map(|entry| (key, entry.priority, entry.last_accessed_at))
            })
            .min_by_key(|(_, priority, last_accessed_at)| (*priority, *last_accessed_at))
            .map(|(key, _, _)| key.to_string())?;

        self.delete(&victim);
        self.stats.record_eviction();
        debug!("Evicted '{}'", victim);
        Some(victim)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.delete(key);
        }

        expired_keys.len()
    }

    // == Preload Bookkeeping ==
    /// Clears the pending flag for `key`, counting a preload if it succeeded.
    pub fn finish_preload(&mut self, key: &str, succeeded: bool) {
        self.pending_preloads.remove(key);
        if succeeded {
            self.stats.record_preload();
        }
    }

    /// Keys flagged for refresh, sorted.
    pub fn pending_preloads(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.pending_preloads.iter().cloned().collect();
        keys.sort();
        keys
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsReport {
        StatsReport::new(
            &self.stats,
            self.entries.len(),
            self.config.max_entries,
            self.pending_preloads.len(),
        )
    }

    // == Clear ==
    /// Drops every entry and pending flag. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.pending_preloads.clear();
    }

    /// Clears the store and rejects further writes.
    pub fn destroy(&mut self) {
        self.clear();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Read-only view of an entry's metadata.
    pub fn entry(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    /// True when the entry map and the LRU order hold the same keys.
    pub fn is_consistent(&self) -> bool {
        self.entries.len() == self.lru.len()
            && self.entries.keys().all(|key| self.lru.contains(key))
    }
}
