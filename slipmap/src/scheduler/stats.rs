//! Scheduler statistics for monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Scheduler counters, updated by both cadences.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Background cycles run.
    pub cycles: AtomicU64,
    /// Tiles attached to the output surface.
    pub tiles_attached: AtomicU64,
    /// Tiles detached from the output surface.
    pub tiles_detached: AtomicU64,
    /// Tile materializations that failed (retried while still wanted).
    pub tiles_failed: AtomicU64,
    /// Prepared tiles served from the cache.
    pub cache_hits: AtomicU64,
    /// Materializations that went through fetch + decode + resolve.
    pub cache_misses: AtomicU64,
    /// Continuous-cadence refresh passes.
    pub transform_refreshes: AtomicU64,
}

impl SchedulerStats {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> SchedulerStatsSnapshot {
        SchedulerStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            tiles_attached: self.tiles_attached.load(Ordering::Relaxed),
            tiles_detached: self.tiles_detached.load(Ordering::Relaxed),
            tiles_failed: self.tiles_failed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            transform_refreshes: self.transform_refreshes.load(Ordering::Relaxed),
        }
    }

}

/// Point-in-time copy of [`SchedulerStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStatsSnapshot {
    pub cycles: u64,
    pub tiles_attached: u64,
    pub tiles_detached: u64,
    pub tiles_failed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub transform_refreshes: u64,
}
