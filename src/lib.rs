//! Local Cache - A lightweight in-process key-value cache
//!
//! Supports optional per-entry TTL expiration with amortized, batched
//! garbage collection: expiring keys are filed into coarse time buckets
//! and a single periodic cycle retires the oldest bucket, so expiry costs
//! the same no matter how many keys are stored.

pub mod cache;
pub mod clock;
pub mod config;
pub mod tasks;

pub use cache::{CacheStore, Diagnostics, Expiration, LocalCache, NextExpiration};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use tasks::spawn_gc_task;
