//! Cache statistics and metrics tracking
//!
//! Counters are updated with relaxed atomics on the read path; a
//! [`CacheStats`] snapshot is not guaranteed to be mutually consistent
//! across fields while the cache is in use.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time counters for one cache instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads served from a fresh slot without touching the loader
    pub hits: u64,

    /// Reads that found the slot stale (pull) or still holding the
    /// placeholder (push)
    pub misses: u64,

    /// Successful loads
    pub loads: u64,

    /// Failed load attempts (errors, timeouts, panics)
    pub load_failures: u64,

    /// Pull reads that gave up on the gate and returned the current value
    pub stale_fallbacks: u64,

    /// Calls to `invalidate`
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total reads)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_reads();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total number of reads (hits + misses)
    pub fn total_reads(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Thread-safe metrics collector for cache operations
#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    stale_fallbacks: AtomicU64,
    invalidations: AtomicU64,
}

impl MetricsCollector {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale_fallback(&self) {
        self.stale_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            stale_fallbacks: self.stale_fallbacks.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for stats.
    use super::*;

    /// Validates `CacheStats::hit_rate` behavior for the empty and mixed
    /// scenarios.
    ///
    /// Assertions:
    /// - Confirms an unused cache reports a zero hit rate.
    /// - Confirms three hits and one miss give 0.75.
    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);

        let metrics = MetricsCollector::default();
        for _ in 0..3 {
            metrics.record_hit();
        }
        metrics.record_miss();

        let stats = metrics.snapshot();
        assert_eq!(stats.total_reads(), 4);
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    /// Validates `MetricsCollector::snapshot` behavior for every counter.
    ///
    /// Assertions:
    /// - Confirms each recorder increments its own field only.
    #[test]
    fn test_snapshot_fields() {
        let metrics = MetricsCollector::default();
        metrics.record_load();
        metrics.record_load_failure();
        metrics.record_load_failure();
        metrics.record_stale_fallback();
        metrics.record_invalidation();

        let stats = metrics.snapshot();
        assert_eq!(
            stats,
            CacheStats {
                hits: 0,
                misses: 0,
                loads: 1,
                load_failures: 2,
                stale_fallbacks: 1,
                invalidations: 1,
            }
        );
    }

    /// Validates `CacheStats` serialization for exporting snapshots.
    ///
    /// Assertions:
    /// - Confirms every counter appears under its field name.
    #[test]
    fn test_snapshot_serializes() {
        let metrics = MetricsCollector::default();
        metrics.record_hit();
        metrics.record_load();

        let json = serde_json::to_value(metrics.snapshot()).expect("serializable snapshot");

        assert_eq!(json["hits"], 1);
        assert_eq!(json["loads"], 1);
        assert_eq!(json["stale_fallbacks"], 0);
    }
}
