//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and the three-way
//! expiration result.

use serde::Serialize;

// == Cache Entry ==
/// A single stored value with its optional absolute expiration time.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiration time in whole seconds, None = never expires
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry, with or without an expiration deadline.
    pub fn new(value: V, expires_at: Option<u64>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks whether the entry's deadline is strictly in the past.
    ///
    /// Boundary condition: an entry expiring exactly at `now` is still
    /// live; it only counts as expired once the clock has moved past the
    /// deadline. The aggressive-expiration read path uses this check; the
    /// lazy GC path works off the bucket queue instead.
    ///
    /// # Returns
    /// - `true` if the entry has a deadline and `deadline < now`
    /// - `false` if the entry never expires or the deadline has not passed
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => expires < now,
            None => false,
        }
    }

    // == Expiration ==
    /// Returns the entry's expiration as a three-way [`Expiration`].
    pub fn expiration(&self) -> Expiration {
        match self.expires_at {
            Some(expires) => Expiration::At(expires),
            None => Expiration::Never,
        }
    }
}

// == Expiration ==
/// Expiration state of a present entry.
///
/// Lookups wrap this in `Option`, keeping "not found" distinguishable from
/// "present but never expires".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Expiration {
    /// Entry never expires
    Never,
    /// Entry expires at the given absolute time (whole seconds)
    At(u64),
}
