//! GC Scheduler Task
//!
//! Background task that drives periodic garbage-collection cycles over the
//! cache's expiration buckets.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns the periodic GC task for a shared cache store.
///
/// The first cycle fires one resolution after the store was constructed.
/// Each cycle retires the oldest bucket under the write lock, then re-arms
/// itself with the delay the store computes, so the cycle grid stays
/// anchored to the construction time even when the process stalls; a
/// stalled process catches up with back-to-back cycles at one-second
/// spacing rather than in a tight loop.
///
/// # Arguments
/// * `store` - Shared reference to the cache store
///
/// # Returns
/// A JoinHandle for the spawned task, used to cancel the schedule on
/// shutdown.
pub fn spawn_gc_task<V: Send + Sync + 'static>(
    store: Arc<RwLock<CacheStore<V>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut delay = {
            let store = store.read().await;
            info!(
                "Starting GC task with resolution of {} seconds",
                store.resolution()
            );
            store.resolution()
        };

        loop {
            tokio::time::sleep(Duration::from_secs(delay)).await;

            let (retired, next_delay) = {
                let mut store = store.write().await;
                let before = store.len();
                let next_delay = store.run_scheduled_cycle();
                (before - store.len(), next_delay)
            };

            if retired > 0 {
                info!("GC cycle: retired {} expired entries", retired);
            } else {
                debug!("GC cycle: nothing to retire");
            }

            delay = next_delay;
        }
    })
}
