//! Cache Store Module
//!
//! The owning aggregate: key-value entries, the time-bucketed expiry index,
//! the GC anchor, and every operation that keeps them consistent.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::diagnostics::{Diagnostics, NextExpiration};
use crate::cache::entry::{CacheEntry, Expiration};
use crate::cache::expiry::ExpiryIndex;
use crate::clock::{Clock, SystemClock};
use crate::config::{CacheConfig, DEFAULT_RESOLUTION};

// == Cache Store ==
/// In-process key-value store with bucketed TTL expiration.
///
/// Expiration is not tracked with one timer per key. Each expiring key is
/// filed in the bucket covering its deadline's resolution window, and a
/// single periodic GC cycle retires the oldest bucket wholesale. Every
/// mutating operation updates the entry map, the expiry index, and the key
/// counter together; neither substructure is ever exposed on its own.
///
/// The store itself is synchronous and single-owner. [`LocalCache`]
/// wraps it behind one lock and drives the GC schedule.
///
/// [`LocalCache`]: crate::cache::LocalCache
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Time-bucketed index of expiring keys
    expiry: ExpiryIndex,
    /// Live entry count, kept in lock-step with `entries`
    key_count: usize,
    /// Seconds per expiration bucket
    resolution: u64,
    /// Absolute time of the most recent GC boundary; block indices are
    /// computed relative to this anchor
    last_gc_cycle_time: u64,
    /// Soft ceiling on live keys
    max_keys: Option<usize>,
    /// Drop logically-expired entries on read, ahead of their GC cycle
    aggressive_expiration: bool,
    /// Injected time source
    clock: Arc<dyn Clock>,
}

impl<V> CacheStore<V> {
    // == Constructors ==
    /// Creates a store on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a store on an injected clock.
    ///
    /// A zero resolution silently falls back to the default rather than
    /// failing construction.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let resolution = if config.resolution == 0 {
            DEFAULT_RESOLUTION
        } else {
            config.resolution
        };
        let last_gc_cycle_time = clock.now();

        Self {
            entries: HashMap::new(),
            expiry: ExpiryIndex::new(),
            key_count: 0,
            resolution,
            last_gc_cycle_time,
            max_keys: config.max_keys,
            aggressive_expiration: config.aggressive_expiration,
            clock,
        }
    }

    // == Add ==
    /// Inserts `value` under `key` unless the key already exists, and
    /// returns the value now associated with the key.
    ///
    /// An existing entry is never overwritten: with `touch_if_exists` its
    /// TTL is re-armed and the stored value returned, otherwise the stored
    /// value is returned and `value` is discarded. When the insert would
    /// cross the `max_keys` ceiling, early GC cycles run first, oldest
    /// bucket first; once nothing remains to retire the ceiling is
    /// advisory and the insert proceeds anyway.
    ///
    /// A `ttl` of zero (or `None`) means the entry never expires.
    pub fn add(&mut self, key: &str, value: V, ttl: Option<u64>, touch_if_exists: bool) -> V
    where
        V: Clone,
    {
        match self.entries.get(key) {
            Some(entry) if !touch_if_exists => return entry.value.clone(),
            Some(_) => {
                if let Some(current) = self.touch(key, ttl) {
                    return current;
                }
            }
            None => {}
        }

        if let Some(max_keys) = self.max_keys {
            while self.key_count > 0 && self.key_count >= max_keys {
                // early GC cycle
                if !self.gc_cycle() {
                    // nothing to retire
                    break;
                }
            }
        }

        let expires_at = ttl.filter(|&ttl| ttl > 0).map(|ttl| self.clock.now() + ttl);
        if let Some(expiration_time) = expires_at {
            let block = self.block_index(expiration_time);
            self.expiry.insert(key, block);
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value.clone(), expires_at));
        self.key_count += 1;

        value
    }

    // == Set ==
    /// Unconditionally replaces any existing entry for `key`, then inserts
    /// fresh. Always returns the new value.
    pub fn set(&mut self, key: &str, value: V, ttl: Option<u64>) -> V
    where
        V: Clone,
    {
        self.del(key);
        self.add(key, value, ttl, false)
    }

    // == Get ==
    /// Retrieves the value for `key` without altering its TTL.
    ///
    /// With aggressive expiration enabled, an entry whose deadline is
    /// strictly in the past is dropped here and reported as absent, ahead
    /// of the GC cycle that would have reclaimed it. Without it, a stale
    /// entry keeps being served until its bucket is retired.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        if self.expire_on_read(key) {
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Get + Touch ==
    /// Retrieves the value for `key` and re-arms its TTL in one step.
    pub fn get_touch(&mut self, key: &str, ttl: Option<u64>) -> Option<V>
    where
        V: Clone,
    {
        if self.expire_on_read(key) {
            return None;
        }
        self.touch(key, ttl)
    }

    // == Touch ==
    /// Re-arms (or clears, for a zero/absent `ttl`) the expiration of an
    /// existing entry and returns its unchanged value.
    ///
    /// Bucket membership only moves when the block index actually changes;
    /// a deadline shift within the same window just rewrites the entry.
    pub fn touch(&mut self, key: &str, ttl: Option<u64>) -> Option<V>
    where
        V: Clone,
    {
        let expires_at = ttl.filter(|&ttl| ttl > 0).map(|ttl| self.clock.now() + ttl);
        let new_block = expires_at.map(|time| self.block_index(time));

        let entry = self.entries.get(key)?;
        let old_block = entry.expires_at.map(|time| self.block_index(time));

        if old_block != new_block {
            if let Some(block) = old_block {
                self.expiry.remove(key, block);
            }
            if let Some(block) = new_block {
                self.expiry.insert(key, block);
            }
        }

        let entry = self.entries.get_mut(key)?;
        entry.expires_at = expires_at;
        Some(entry.value.clone())
    }

    // == Expiration Time ==
    /// Expiration state for `key`: `None` when the key is absent,
    /// otherwise the entry's deadline or [`Expiration::Never`].
    pub fn get_expiration_time(&self, key: &str) -> Option<Expiration> {
        self.entries.get(key).map(|entry| entry.expiration())
    }

    // == Delete ==
    /// Removes an entry and returns its value.
    ///
    /// The key leaves its bucket before the entry is dropped, so the
    /// bucket cannot later retire a slot still naming a gone key.
    pub fn del(&mut self, key: &str) -> Option<V> {
        if let Some(expiration_time) = self.entries.get(key).and_then(|entry| entry.expires_at) {
            let block = self.block_index(expiration_time);
            self.expiry.remove(key, block);
        }

        let entry = self.entries.remove(key)?;
        self.key_count -= 1;
        Some(entry.value)
    }

    // == Flush ==
    /// Drops every entry and bucket. The GC anchor and the pending cycle
    /// are left untouched.
    pub fn flush(&mut self) {
        self.entries.clear();
        self.expiry.clear();
        self.key_count = 0;
    }

    // == GC Cycle ==
    /// Retires the oldest bucket: deletes every key still stored from it
    /// and shifts the queue down by one block index.
    ///
    /// Returns true when the retired slot was an allocated bucket, false
    /// for a hole or an empty queue, which is what stops the ceiling
    /// pressure loop in [`add`](CacheStore::add). Keys already removed by
    /// other means are skipped, so double deletion cannot corrupt the
    /// counter.
    pub fn gc_cycle(&mut self) -> bool {
        match self.expiry.retire_front() {
            Some(Some(keys)) => {
                for key in keys {
                    if self.entries.remove(&key).is_some() {
                        self.key_count -= 1;
                    }
                }
                true
            }
            _ => false,
        }
    }

    // == Scheduled Cycle ==
    /// Runs one scheduled GC cycle and advances the anchor by exactly one
    /// resolution step, not to the actual firing time, so the bucket grid
    /// stays aligned to multiples of the resolution from construction.
    ///
    /// Returns the delay in seconds until the next cycle, floored at one
    /// second so that missed windows are caught up at minimum spacing
    /// instead of in a zero-delay loop.
    pub fn run_scheduled_cycle(&mut self) -> u64 {
        let current_time = self.last_gc_cycle_time + self.resolution;

        self.gc_cycle();
        self.last_gc_cycle_time = current_time;

        let next_deadline = self.last_gc_cycle_time + self.resolution;
        let delay = next_deadline.saturating_sub(self.clock.now());
        if delay == 0 {
            1
        } else {
            delay
        }
    }

    // == Diagnostics ==
    /// Read-only snapshot of cache occupancy and the next bucket to fire.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            keys: self.key_count,
            expiration_blocks: self.expiry.allocated_slots(),
            resolution: self.resolution,
            next_expiration: NextExpiration {
                keys: self.expiry.front_len(),
                time: self.last_gc_cycle_time + self.resolution,
            },
        }
    }

    // == Accessors ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.key_count
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Configured bucket granularity in seconds.
    pub fn resolution(&self) -> u64 {
        self.resolution
    }

    /// Absolute time of the most recent GC boundary.
    pub fn last_gc_cycle_time(&self) -> u64 {
        self.last_gc_cycle_time
    }

    // == Block Arithmetic ==
    /// Block index for an absolute expiration time, relative to the
    /// current anchor. Deadlines at or behind the anchor land in block 0.
    fn block_index(&self, expiration_time: u64) -> usize {
        (expiration_time.saturating_sub(self.last_gc_cycle_time) / self.resolution) as usize
    }

    /// Aggressive-expiration read check: drops an entry whose deadline has
    /// already passed and reports whether it did.
    fn expire_on_read(&mut self, key: &str) -> bool {
        if !self.aggressive_expiration {
            return false;
        }
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                self.del(key);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
impl<V> CacheStore<V> {
    /// Test-only invariant check: the counter is in lock-step with the
    /// entry map, every expiring entry sits in exactly the bucket its
    /// deadline maps to, and no bucket names a key that is gone.
    ///
    /// Only holds while no forced (ceiling-pressure) cycles have run;
    /// those shift the queue without moving the anchor.
    pub(crate) fn check_consistency(&self) {
        assert_eq!(self.key_count, self.entries.len(), "key counter drifted");

        let mut expiring = 0;
        for (key, entry) in &self.entries {
            match entry.expires_at {
                Some(expiration_time) => {
                    expiring += 1;
                    let expected = self.block_index(expiration_time);
                    assert_eq!(
                        self.expiry.positions_of(key),
                        vec![expected],
                        "key {key:?} not in its deadline's bucket"
                    );
                }
                None => assert_eq!(
                    self.expiry.positions_of(key),
                    Vec::<usize>::new(),
                    "eternal key {key:?} indexed for expiry"
                ),
            }
        }
        assert_eq!(self.expiry.total_keys(), expiring, "stale keys in buckets");
    }
}
