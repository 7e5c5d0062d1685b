//! Tile scheduler.
//!
//! Decides which tiles must exist for the current camera, materializes
//! them lazily through the style engine with a cache in front, keeps
//! previously materialized tiles positioned as the camera moves, and
//! detaches tiles that leave the wanted set.
//!
//! Two decoupled cadences run as separate tasks under one cancellation
//! token:
//!
//! - the **continuous** cadence re-transforms attached tiles every display
//!   frame from the latest camera snapshot, and never fetches;
//! - the **background** cadence recomputes the wanted set, diffs it
//!   against the previous cycle, materializes additions and detaches
//!   removals.
//!
//! They share one attached-tile registry with single-writer discipline:
//! only the background task mutates it, the continuous task reads.

mod stats;
mod worker;

pub use stats::{SchedulerStats, SchedulerStatsSnapshot};
pub use worker::{combined_transform, AttachedTiles, BackgroundWorker, TransformRefresher};

use crate::cache::TileCache;
use crate::camera::SharedCamera;
use crate::source::TileSource;
use crate::style::StyleEngine;
use crate::surface::OutputSurface;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Continuous-cadence period (display refresh).
    pub frame_interval: Duration,
    /// Background-cadence period (idle work).
    pub idle_interval: Duration,
    /// Prefetch the expanded 3x3 grid around the camera instead of the
    /// minimal viewport cover.
    pub expanded: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            idle_interval: Duration::from_millis(50),
            expanded: true,
        }
    }
}

/// Handle to a running scheduler; stopping cancels both loops.
#[derive(Debug)]
pub struct SchedulerHandle {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Cancel both cadences and wait for them to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
        info!("tile scheduler stopped");
    }

    /// Whether the scheduler has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// The tile scheduler.
///
/// Owns the prepared-tile cache and the wanted-set bookkeeping; no other
/// component mutates them.
pub struct TileScheduler {
    config: SchedulerConfig,
    cache: Arc<dyn TileCache>,
    stats: Arc<SchedulerStats>,
}

impl TileScheduler {
    /// Create a scheduler with the given cache.
    pub fn new(config: SchedulerConfig, cache: Arc<dyn TileCache>) -> Self {
        Self {
            config,
            cache,
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    /// Access the statistics for monitoring.
    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }

    /// Build the two cadence drivers without spawning tasks.
    ///
    /// For hosts that lack an idle-scheduling primitive and drive cycles
    /// themselves (and for tests); [`TileScheduler::start`] is the spawned
    /// equivalent.
    pub fn workers(
        &self,
        camera: SharedCamera,
        source: Arc<dyn TileSource>,
        style: Arc<StyleEngine>,
        surface: Arc<dyn OutputSurface>,
    ) -> (BackgroundWorker, TransformRefresher) {
        let attached: AttachedTiles = Arc::new(RwLock::new(HashMap::new()));
        let worker = BackgroundWorker::new(
            camera.clone(),
            source,
            style,
            Arc::clone(&surface),
            Arc::clone(&self.cache),
            Arc::clone(&attached),
            Arc::clone(&self.stats),
            self.config.expanded,
        );
        let refresher = TransformRefresher::new(camera, surface, attached, Arc::clone(&self.stats));
        (worker, refresher)
    }

    /// Spawn both cadences and return the handle controlling them.
    pub fn start(
        &self,
        camera: SharedCamera,
        source: Arc<dyn TileSource>,
        style: Arc<StyleEngine>,
        surface: Arc<dyn OutputSurface>,
    ) -> SchedulerHandle {
        let (mut worker, mut refresher) = self.workers(camera, source, style, surface);
        let cancel = CancellationToken::new();

        let background_cancel = cancel.clone();
        let idle_interval = self.config.idle_interval;
        let background = tokio::spawn(async move {
            let mut interval = tokio::time::interval(idle_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = background_cancel.cancelled() => break,
                    _ = interval.tick() => worker.run_cycle().await,
                }
            }
        });

        let continuous_cancel = cancel.clone();
        let frame_interval = self.config.frame_interval;
        let continuous = tokio::spawn(async move {
            let mut interval = tokio::time::interval(frame_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = continuous_cancel.cancelled() => break,
                    _ = interval.tick() => refresher.refresh(),
                }
            }
        });

        info!(
            frame_ms = self.config.frame_interval.as_millis() as u64,
            idle_ms = self.config.idle_interval.as_millis() as u64,
            expanded = self.config.expanded,
            "tile scheduler started"
        );

        SchedulerHandle {
            cancel,
            tasks: vec![background, continuous],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LruTileCache;
    use crate::camera::{Camera, CameraMove, CameraOptions};
    use crate::coord::{tile_to_coordinates, TileCoord};
    use crate::source::{SourceError, StaticTileSource};
    use crate::surface::RecordingSurface;
    use crate::tile::{RasterTile, RawTile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const Z: u8 = 4;

    /// Camera parked in the middle of tile (5, 5) at z=4.
    fn test_camera() -> SharedCamera {
        let (lon, lat) = tile_to_coordinates(5.5, 5.5, Z);
        SharedCamera::new(Camera::new(CameraOptions {
            longitude: lon,
            latitude: lat,
            zoom: Z as f64,
            ..Default::default()
        }))
    }

    fn raster_style() -> Arc<StyleEngine> {
        Arc::new(StyleEngine::new(
            serde_json::from_str(
                r#"{
                    "layers": [
                        { "id": "satellite", "type": "raster", "source": "orthophotos" }
                    ]
                }"#,
            )
            .unwrap(),
        ))
    }

    /// A source with a raster tile for every coordinate at `Z`, counting
    /// fetches.
    struct WorldSource {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl TileSource for WorldSource {
        async fn fetch(
            &self,
            _name: &str,
            tile: TileCoord,
        ) -> Result<Option<Arc<RawTile>>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Arc::new(RawTile::Raster(RasterTile {
                image: format!("orthophotos/{tile}"),
            }))))
        }
    }

    fn scheduler() -> TileScheduler {
        TileScheduler::new(SchedulerConfig::default(), Arc::new(LruTileCache::default()))
    }

    #[tokio::test]
    async fn test_cycle_attaches_wanted_grid() {
        let camera = test_camera();
        let surface = Arc::new(RecordingSurface::new());
        let source = Arc::new(WorldSource {
            fetches: AtomicUsize::new(0),
        });
        let sched = scheduler();
        let (mut worker, _) = sched.workers(camera, source, raster_style(), surface.clone());

        worker.run_cycle().await;

        assert_eq!(surface.attached_tiles().len(), 9, "expanded 3x3 grid");
        assert!(surface.is_attached(TileCoord::new(5, 5, Z)));
        assert_eq!(sched.stats().snapshot().tiles_attached, 9);
    }

    #[tokio::test]
    async fn test_stable_camera_is_idempotent_across_cycles() {
        let camera = test_camera();
        let surface = Arc::new(RecordingSurface::new());
        let source = Arc::new(WorldSource {
            fetches: AtomicUsize::new(0),
        });
        let sched = scheduler();
        let (mut worker, _) = sched.workers(camera, source.clone(), raster_style(), surface.clone());

        worker.run_cycle().await;
        let fetches = source.fetches.load(Ordering::SeqCst);
        worker.run_cycle().await;

        assert_eq!(source.fetches.load(Ordering::SeqCst), fetches);
        assert_eq!(surface.attach_count(), 9, "nothing re-attached");
        assert_eq!(surface.detach_count(), 0);
    }

    #[tokio::test]
    async fn test_pan_detaches_left_behind_tiles_and_keeps_cache() {
        let camera = test_camera();
        let surface = Arc::new(RecordingSurface::new());
        let source = Arc::new(WorldSource {
            fetches: AtomicUsize::new(0),
        });
        let cache = Arc::new(LruTileCache::default());
        let sched = TileScheduler::new(SchedulerConfig::default(), cache.clone());
        let (mut worker, _) =
            sched.workers(camera.clone(), source, raster_style(), surface.clone());

        worker.run_cycle().await;
        assert!(surface.is_attached(TileCoord::new(4, 4, Z)));

        // Pan two tiles east: column 4 leaves the wanted set.
        let (lon, lat) = tile_to_coordinates(7.5, 5.5, Z);
        camera.apply_move(CameraMove::pan_to(lon, lat));
        worker.run_cycle().await;

        assert!(!surface.is_attached(TileCoord::new(4, 4, Z)));
        assert!(surface.is_attached(TileCoord::new(7, 5, Z)));
        assert!(
            cache.contains(&TileCoord::new(4, 4, Z)),
            "detached tile stays cached"
        );
    }

    #[tokio::test]
    async fn test_cache_hit_short_circuits_fetch() {
        let camera = test_camera();
        let surface = Arc::new(RecordingSurface::new());
        let source = Arc::new(WorldSource {
            fetches: AtomicUsize::new(0),
        });
        let sched = scheduler();
        let (mut worker, _) =
            sched.workers(camera.clone(), source.clone(), raster_style(), surface.clone());

        worker.run_cycle().await;

        // Pan away and back: the original tiles re-attach from cache.
        let (lon, lat) = tile_to_coordinates(8.5, 5.5, Z);
        camera.apply_move(CameraMove::pan_to(lon, lat));
        worker.run_cycle().await;
        let (lon, lat) = tile_to_coordinates(5.5, 5.5, Z);
        camera.apply_move(CameraMove::pan_to(lon, lat));
        worker.run_cycle().await;

        let snapshot = sched.stats().snapshot();
        assert!(snapshot.cache_hits >= 9, "return pan served from cache");
        assert_eq!(
            source.fetches.load(Ordering::SeqCst) as u64,
            snapshot.cache_misses,
            "every fetch corresponds to a cache miss"
        );
    }

    /// Source that fails for one coordinate.
    struct FlakySource {
        bad: TileCoord,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl TileSource for FlakySource {
        async fn fetch(
            &self,
            _name: &str,
            tile: TileCoord,
        ) -> Result<Option<Arc<RawTile>>, SourceError> {
            if tile == self.bad {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                return Err(SourceError::FetchFailed {
                    tile,
                    reason: "simulated outage".to_string(),
                });
            }
            Ok(Some(Arc::new(RawTile::Raster(RasterTile {
                image: format!("orthophotos/{tile}"),
            }))))
        }
    }

    #[tokio::test]
    async fn test_failed_tile_does_not_abort_cycle_and_is_retried() {
        let camera = test_camera();
        let surface = Arc::new(RecordingSurface::new());
        let bad = TileCoord::new(5, 5, Z);
        let source = Arc::new(FlakySource {
            bad,
            attempts: AtomicUsize::new(0),
        });
        let sched = scheduler();
        let (mut worker, _) = sched.workers(camera, source.clone(), raster_style(), surface.clone());

        worker.run_cycle().await;

        assert_eq!(surface.attached_tiles().len(), 8, "8 of 9 attached");
        assert!(!surface.is_attached(bad), "failed tile stays empty");
        assert_eq!(sched.stats().snapshot().tiles_failed, 1);

        // Still wanted, so the next cycle retries it.
        worker.run_cycle().await;
        assert_eq!(source.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresher_updates_attached_transforms() {
        let camera = test_camera();
        let surface = Arc::new(RecordingSurface::new());
        let source = Arc::new(WorldSource {
            fetches: AtomicUsize::new(0),
        });
        let sched = scheduler();
        let (mut worker, mut refresher) =
            sched.workers(camera.clone(), source, raster_style(), surface.clone());

        worker.run_cycle().await;
        let before = surface.attached_layers(TileCoord::new(5, 5, Z))[0].transform;

        // Continuous zoom within the same discrete level.
        camera.apply_move(CameraMove::zoom_to(Z as f64 + 0.3));
        refresher.refresh();

        let after = surface.attached_layers(TileCoord::new(5, 5, Z))[0].transform;
        assert!(after.scale > before.scale);
        assert_eq!(sched.stats().snapshot().transform_refreshes, 1);
    }

    #[tokio::test]
    async fn test_start_and_stop_run_both_cadences() {
        let camera = test_camera();
        let surface = Arc::new(RecordingSurface::new());
        let source = Arc::new(WorldSource {
            fetches: AtomicUsize::new(0),
        });
        let sched = TileScheduler::new(
            SchedulerConfig {
                frame_interval: Duration::from_millis(5),
                idle_interval: Duration::from_millis(5),
                expanded: true,
            },
            Arc::new(LruTileCache::default()),
        );
        let handle = sched.start(camera, source, raster_style(), surface.clone());

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.stop().await;

        let snapshot = sched.stats().snapshot();
        assert!(snapshot.cycles > 0);
        assert!(snapshot.transform_refreshes > 0);
        assert_eq!(surface.attached_tiles().len(), 9);
    }
}
