//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from every
//! enabled tier. Tiers never sweep themselves implicitly: expiry is
//! detected lazily on read, and everything else waits for this task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TieredCache;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified
/// interval between sweeps. Each sweep walks the fast, scoped, and
/// durable tiers in turn.
///
/// # Arguments
/// * `cache` - Shared reference to the cache engine
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the
/// task during graceful shutdown.
pub fn spawn_cleanup_task(cache: Arc<TieredCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();

            // Log sweep statistics
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
