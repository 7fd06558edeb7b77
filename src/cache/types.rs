//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type - deterministic identifier for one memoized call
/// (operation id + canonical argument serialization)
pub type CacheKey = String;

/// Cache value type - stores the canonical JSON form of a read result
pub type CacheValue = String;

/// Statistics and metrics for cache performance monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses (a fresh computation was started)
    pub misses: u64,

    /// Number of callers that joined an already in-flight computation
    /// instead of starting their own
    pub coalesced: u64,

    /// Number of entries currently in cache
    pub entries: usize,

    /// Number of entries removed by tag invalidation
    pub invalidations: u64,

    /// Number of completed computations discarded because their key was
    /// invalidated while they were in flight
    pub fenced: u64,

    /// Number of entries evicted by the capacity policy
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, coalesced: {}, entries: {}, invalidations: {}, fenced: {}, evictions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.coalesced,
            self.entries,
            self.invalidations,
            self.fenced,
            self.evictions
        )
    }
}
