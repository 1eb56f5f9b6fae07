//! Clock Module
//!
//! Injectable time source used for all expiration arithmetic.
//!
//! The cache works in whole seconds of absolute time. The clock is passed
//! in at construction so every instance stays independently testable; the
//! default is the system wall clock truncated to whole seconds.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

// == Clock Trait ==
/// Source of the current absolute time in whole seconds.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current absolute time in whole seconds.
    fn now(&self) -> u64;
}

// == System Clock ==
/// Default clock: wall-clock time truncated to whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        Utc::now().timestamp() as u64
    }
}

// == Manual Clock ==
/// Settable clock for deterministic tests.
///
/// Time only moves when told to via [`advance`](ManualClock::advance) or
/// [`set`](ManualClock::set).
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a manual clock starting at the given absolute time.
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Creates a manual clock wrapped in an `Arc`, ready for injection.
    pub fn shared(start: u64) -> Arc<Self> {
        Arc::new(Self::new(start))
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, time: u64) {
        self.now.store(time, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
