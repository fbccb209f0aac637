//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStore, CacheValue, Clock};

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for `interval` between runs and locks the store only for
/// the sweep itself. It holds a weak reference, so it ends on its own once
/// every handle to the cache has been dropped; `AdvancedCache::destroy`
/// aborts it directly.
///
/// Must be called from within a tokio runtime.
pub fn spawn_cleanup_task<T: CacheValue>(
    name: &str,
    store: Weak<Mutex<CacheStore<T>>>,
    clock: Arc<dyn Clock>,
    interval: Duration,
) -> JoinHandle<()> {
    let name = name.to_string();

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup for cache '{}' every {} ms",
            name,
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let Some(store) = store.upgrade() else {
                    debug!("Cache '{}' dropped, stopping cleanup", name);
                    break;
                };
                let mut guard = store.lock();
                guard.cleanup_expired(clock.now_ms())
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries from '{}'", removed, name);
            } else {
                debug!("TTL cleanup: no expired entries in '{}'", name);
            }
        }
    })
}
