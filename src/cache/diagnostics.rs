//! Cache Diagnostics Module
//!
//! Read-only occupancy snapshots for observability.

use serde::Serialize;

// == Diagnostics ==
/// Point-in-time view of cache occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Number of live entries
    pub keys: usize,
    /// Number of allocated expiration bucket slots
    pub expiration_blocks: usize,
    /// Configured bucket granularity in seconds
    pub resolution: u64,
    /// The next bucket the garbage collector will retire
    pub next_expiration: NextExpiration,
}

// == Next Expiration ==
/// The next bucket to be retired: how many keys it holds and the absolute
/// time it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextExpiration {
    /// Keys queued in the front bucket
    pub keys: usize,
    /// Absolute time (whole seconds) of the next retirement
    pub time: u64,
}
