//! Query result cache
//!
//! Successful reports are kept as serialized JSON for a short TTL, keyed by
//! query identity. Degraded results are never stored.

pub mod keys;
pub mod store;

pub use keys::QueryKey;
pub use store::{spawn_cleanup_task, CacheStats, CachedResult, QueryCache};

use std::time::Duration;

use crate::config::Args;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached results
    pub max_entries: usize,
    /// Lifetime of a cached result
    pub ttl: Duration,
    /// How often expired entries are swept
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    pub fn from_args(args: &Args) -> Self {
        let ttl = args.cache_ttl();
        Self {
            max_entries: args.cache_max_entries,
            ttl,
            // Sweep at least once per TTL, but not more than every 5 seconds
            cleanup_interval: ttl.clamp(Duration::from_secs(5), Duration::from_secs(60)),
        }
    }
}
