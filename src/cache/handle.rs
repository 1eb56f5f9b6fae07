//! Cache Handle Module
//!
//! Shared async façade over the store: one lock-guarded aggregate plus the
//! periodic GC task, cancelled on shutdown.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::cache::diagnostics::Diagnostics;
use crate::cache::entry::Expiration;
use crate::cache::store::CacheStore;
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::tasks::spawn_gc_task;

// == Local Cache ==
/// Shared handle to a cache and its GC schedule.
///
/// Construction arms the first GC cycle immediately; [`shutdown`]
/// cancels it. Clones share the same store and schedule. The store,
/// expiry index, counter, and anchor all live behind a single lock, so no
/// operation ever observes them out of step with each other.
///
/// [`shutdown`]: LocalCache::shutdown
#[derive(Debug, Clone)]
pub struct LocalCache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    gc_task: Arc<GcTask>,
}

/// Cancels the GC task when the last handle goes away.
#[derive(Debug)]
struct GcTask(JoinHandle<()>);

impl Drop for GcTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<V: Send + Sync + 'static> LocalCache<V> {
    // == Constructors ==
    /// Creates a cache on the system clock and arms its first GC cycle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: CacheConfig) -> Self {
        Self::from_store(CacheStore::new(config))
    }

    /// Creates a cache on an injected clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_store(CacheStore::with_clock(config, clock))
    }

    fn from_store(store: CacheStore<V>) -> Self {
        let store = Arc::new(RwLock::new(store));
        let gc_task = spawn_gc_task(Arc::clone(&store));

        Self {
            store,
            gc_task: Arc::new(GcTask(gc_task)),
        }
    }

    // == Operations ==
    /// See [`CacheStore::add`].
    pub async fn add(&self, key: &str, value: V, ttl: Option<u64>, touch_if_exists: bool) -> V
    where
        V: Clone,
    {
        self.store.write().await.add(key, value, ttl, touch_if_exists)
    }

    /// See [`CacheStore::set`].
    pub async fn set(&self, key: &str, value: V, ttl: Option<u64>) -> V
    where
        V: Clone,
    {
        self.store.write().await.set(key, value, ttl)
    }

    /// See [`CacheStore::get`].
    pub async fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.store.write().await.get(key)
    }

    /// See [`CacheStore::get_touch`].
    pub async fn get_touch(&self, key: &str, ttl: Option<u64>) -> Option<V>
    where
        V: Clone,
    {
        self.store.write().await.get_touch(key, ttl)
    }

    /// See [`CacheStore::touch`].
    pub async fn touch(&self, key: &str, ttl: Option<u64>) -> Option<V>
    where
        V: Clone,
    {
        self.store.write().await.touch(key, ttl)
    }

    /// See [`CacheStore::get_expiration_time`].
    pub async fn get_expiration_time(&self, key: &str) -> Option<Expiration> {
        self.store.read().await.get_expiration_time(key)
    }

    /// See [`CacheStore::del`].
    pub async fn del(&self, key: &str) -> Option<V> {
        self.store.write().await.del(key)
    }

    /// See [`CacheStore::flush`].
    pub async fn flush(&self) {
        self.store.write().await.flush();
    }

    /// See [`CacheStore::diagnostics`].
    pub async fn diagnostics(&self) -> Diagnostics {
        self.store.read().await.diagnostics()
    }

    // == Shutdown ==
    /// Cancels the pending GC cycle.
    ///
    /// The store stays readable afterwards, but no further scheduled
    /// retirement will run; behavior of continued mutation after shutdown
    /// carries no guarantees beyond that.
    pub fn shutdown(&self) {
        self.gc_task.0.abort();
    }
}
