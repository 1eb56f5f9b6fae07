//! Configuration Module
//!
//! Cache construction parameters, loadable from environment variables.

use std::env;

/// Granularity used when none is configured, in seconds.
pub const DEFAULT_RESOLUTION: u64 = 60;

/// Cache configuration parameters.
///
/// A zero `resolution` is not rejected; the cache silently falls back to
/// [`DEFAULT_RESOLUTION`] when it sees one.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Seconds per expiration bucket. The precision-vs-overhead knob:
    /// expiry is accurate to within one window of this length.
    pub resolution: u64,
    /// Soft ceiling on live keys. Crossing it forces early GC cycles;
    /// once no expiring keys remain to reclaim, the ceiling is advisory.
    pub max_keys: Option<usize>,
    /// When true, a get never returns a value whose deadline has passed,
    /// even if the owning GC cycle has not run yet.
    pub aggressive_expiration: bool,
}

impl CacheConfig {
    /// Creates a configuration with the given bucket granularity and all
    /// other options at their defaults.
    pub fn new(resolution: u64) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Creates a CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_RESOLUTION` - Seconds per expiration bucket (default: 60)
    /// - `CACHE_MAX_KEYS` - Soft key ceiling (default: unset)
    /// - `CACHE_AGGRESSIVE_EXPIRATION` - Drop expired entries on read (default: false)
    pub fn from_env() -> Self {
        Self {
            resolution: env::var("CACHE_RESOLUTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&r| r > 0)
                .unwrap_or(DEFAULT_RESOLUTION),
            max_keys: env::var("CACHE_MAX_KEYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&m| m > 0),
            aggressive_expiration: env::var("CACHE_AGGRESSIVE_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            max_keys: None,
            aggressive_expiration: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.resolution, 60);
        assert_eq!(config.max_keys, None);
        assert!(!config.aggressive_expiration);
    }

    #[test]
    fn test_config_new_keeps_other_defaults() {
        let config = CacheConfig::new(3);
        assert_eq!(config.resolution, 3);
        assert_eq!(config.max_keys, None);
        assert!(!config.aggressive_expiration);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_RESOLUTION");
        env::remove_var("CACHE_MAX_KEYS");
        env::remove_var("CACHE_AGGRESSIVE_EXPIRATION");

        let config = CacheConfig::from_env();
        assert_eq!(config.resolution, 60);
        assert_eq!(config.max_keys, None);
        assert!(!config.aggressive_expiration);
    }
}
