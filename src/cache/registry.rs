//! Cache Registry Module
//!
//! The three cache domains of the monitoring dashboard, constructed once
//! by the application and passed to whatever needs them.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::cache::{keys, AdvancedCache, CacheOptions, CacheValue, Clock, PreloadItem, StatsReport, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Public names of the cache domains, as used by the monitor API.
pub const CACHE_NAMES: [&str; 3] = ["global", "deviceData", "gpsData"];

/// Priority of warmed-up device entries; above the default of 1 so
/// aggregation results are evicted before device status.
const WARMUP_PRIORITY: u32 = 2;

// == All Stats ==
/// Stats of every domain, keyed the way the dashboard expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllStats {
    pub global: StatsReport,
    pub device_data: StatsReport,
    pub gps_data: StatsReport,
}

// == Cache Registry ==
/// Owner of the `global`, `deviceData` and `gpsData` caches.
pub struct CacheRegistry<T> {
    global: AdvancedCache<T>,
    device_data: AdvancedCache<T>,
    gps_data: AdvancedCache<T>,
}

impl<T: CacheValue> CacheRegistry<T> {
    // == Constructor ==
    /// Builds all three caches from their configured profiles.
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let registry = Self::from_parts(
            AdvancedCache::with_clock("global", config.global.clone(), clock.clone()),
            AdvancedCache::with_clock("deviceData", config.device_data.clone(), clock.clone()),
            AdvancedCache::with_clock("gpsData", config.gps_data.clone(), clock),
        );
        info!(
            "Cache registry ready: global={}, deviceData={}, gpsData={} max entries",
            config.global.max_entries, config.device_data.max_entries, config.gps_data.max_entries
        );
        registry
    }

    pub fn from_parts(
        global: AdvancedCache<T>,
        device_data: AdvancedCache<T>,
        gps_data: AdvancedCache<T>,
    ) -> Self {
        Self {
            global,
            device_data,
            gps_data,
        }
    }

    pub fn global(&self) -> &AdvancedCache<T> {
        &self.global
    }

    pub fn device_data(&self) -> &AdvancedCache<T> {
        &self.device_data
    }

    pub fn gps_data(&self) -> &AdvancedCache<T> {
        &self.gps_data
    }

    /// Looks a domain up by its API name. Snake-case aliases are accepted.
    pub fn by_name(&self, name: &str) -> Result<&AdvancedCache<T>> {
        match name {
            "global" => Ok(&self.global),
            "deviceData" | "device_data" => Ok(&self.device_data),
            "gpsData" | "gps_data" => Ok(&self.gps_data),
            other => Err(CacheError::UnknownCache(other.to_string())),
        }
    }

    // == Stats ==
    pub fn all_stats(&self) -> AllStats {
        AllStats {
            global: self.global.stats(),
            device_data: self.device_data.stats(),
            gps_data: self.gps_data.stats(),
        }
    }

    // == Clear ==
    pub fn clear_all(&self) {
        self.global.clear();
        self.device_data.clear();
        self.gps_data.clear();
    }

    /// Destroys every domain, stopping their cleanup tasks.
    pub fn destroy_all(&self) {
        self.global.destroy();
        self.device_data.destroy();
        self.gps_data.destroy();
    }

    // == Warmup ==
    /// Preloads the latest status of each device into the device cache.
    ///
    /// `fetch` is called once per id; failures are logged per device and
    /// do not stop the others. Returns how many devices were cached.
    pub async fn warmup_device_cache<I, F, Fut>(&self, device_ids: I, fetch: F) -> usize
    where
        I: IntoIterator,
        I::Item: Into<String>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let items: Vec<PreloadItem<T>> = device_ids
            .into_iter()
            .map(Into::into)
            .map(|device_id: String| {
                let pending = fetch(device_id.clone());
                PreloadItem::new(keys::device_latest_key(&device_id), move || pending)
                    .with_options(CacheOptions::new().priority(WARMUP_PRIORITY))
            })
            .collect();

        let requested = items.len();
        let cached = self.device_data.preload_batch(items).await;
        info!("Device cache warmup: {}/{} devices cached", cached, requested);
        cached
    }
}

impl<T> Clone for CacheRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            global: self.global.clone(),
            device_data: self.device_data.clone(),
            gps_data: self.gps_data.clone(),
        }
    }
}
