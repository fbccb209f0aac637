//! Cache Statistics Module
//!
//! Tracks cache performance counters and renders point-in-time reports.

use serde::Serialize;

// == Cache Stats ==
/// Cumulative counters. Survive `clear()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed retrievals (absent, expired or invalid)
    pub misses: u64,
    /// Number of entries evicted to make room for new keys
    pub evictions: u64,
    /// Number of successful preloads
    pub preloads: u64,
    /// Number of writes stored in compressed form
    pub compressions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_preload(&mut self) {
        self.preloads += 1;
    }

    pub fn record_compression(&mut self) {
        self.compressions += 1;
    }
}

// == Stats Report ==
/// Snapshot returned by `AdvancedCache::stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub preloads: u64,
    pub compressions: u64,
    /// hits / (hits + misses), 0.0 before the first read
    pub hit_rate: f64,
    /// Current number of entries
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// size / max_size
    pub usage: f64,
    /// Keys flagged for refresh
    pub preload_queue_size: usize,
}

impl StatsReport {
    /// Builds a report from counters and current occupancy.
    pub fn new(stats: &CacheStats, size: usize, max_size: usize, preload_queue_size: usize) -> Self {
        let usage = if max_size == 0 {
            0.0
        } else {
            size as f64 / max_size as f64
        };

        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            preloads: stats.preloads,
            compressions: stats.compressions,
            hit_rate: stats.hit_rate(),
            size,
            max_size,
            usage,
            preload_queue_size,
        }
    }

    /// Hit rate as a percentage with two decimals, e.g. `"75.00%"`.
    pub fn hit_rate_percent(&self) -> String {
        format!("{:.2}%", self.hit_rate * 100.0)
    }

    /// Usage as a percentage with one decimal, e.g. `"12.5%"`.
    pub fn usage_percent(&self) -> String {
        format!("{:.1}%", self.usage * 100.0)
    }
}
