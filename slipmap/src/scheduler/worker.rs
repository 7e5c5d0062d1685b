//! The two scheduler cadences.
//!
//! [`BackgroundWorker`] runs the background cadence: diff the wanted tile
//! set, materialize additions (cache-first), detach removals. It is the
//! single writer of the attached-tile registry. [`TransformRefresher`]
//! runs the continuous cadence: it only reads the registry and pushes
//! fresh transforms. Both are public so hosts without an idle-scheduling
//! primitive (or tests) can drive cycles directly instead of using the
//! spawned loops in [`TileScheduler`](super::TileScheduler).

use super::stats::SchedulerStats;
use crate::cache::TileCache;
use crate::camera::SharedCamera;
use crate::coord::{self, TileCoord, Transform};
use crate::source::TileSource;
use crate::style::{PreparedTile, StyleEngine};
use crate::surface::{HandleId, OutputSurface};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace, warn};

/// Registry of tiles currently attached to the output surface.
///
/// Written only by the background worker; the transform refresher reads.
pub type AttachedTiles = Arc<RwLock<HashMap<TileCoord, Vec<HandleId>>>>;

/// Background cadence: wanted-set diffing and tile materialization.
pub struct BackgroundWorker {
    camera: SharedCamera,
    source: Arc<dyn TileSource>,
    style: Arc<StyleEngine>,
    surface: Arc<dyn OutputSurface>,
    cache: Arc<dyn TileCache>,
    attached: AttachedTiles,
    stats: Arc<SchedulerStats>,
    /// Wanted set from the previous cycle, for the removal diff.
    wanted: HashSet<TileCoord>,
    /// Whether to prefetch the expanded 3x3 grid around the camera.
    expanded: bool,
}

impl BackgroundWorker {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        camera: SharedCamera,
        source: Arc<dyn TileSource>,
        style: Arc<StyleEngine>,
        surface: Arc<dyn OutputSurface>,
        cache: Arc<dyn TileCache>,
        attached: AttachedTiles,
        stats: Arc<SchedulerStats>,
        expanded: bool,
    ) -> Self {
        Self {
            camera,
            source,
            style,
            surface,
            cache,
            attached,
            stats,
            wanted: HashSet::new(),
            expanded,
        }
    }

    /// Run one background cycle.
    ///
    /// The wanted-set snapshot is fixed at the start of the cycle; camera
    /// moves that land mid-cycle are picked up on the next one. The only
    /// exception is the still-wanted re-validation after each
    /// materialization, which checks against the then-current camera so a
    /// tile that stopped being wanted while its fetch was in flight is not
    /// attached (its cache entry is kept).
    pub async fn run_cycle(&mut self) {
        let camera = self.camera.snapshot();
        let wanted: HashSet<TileCoord> =
            coord::wanted_tiles(camera.x(), camera.y(), camera.z(), self.expanded)
                .into_iter()
                .collect();

        // Detach tiles that left the wanted set. Cache entries are
        // retained; only the surface attachment goes.
        let removed: Vec<TileCoord> = self.wanted.difference(&wanted).copied().collect();
        if !removed.is_empty() {
            let mut attached = self.attached.write().expect("attached lock poisoned");
            for tile in &removed {
                if let Some(handles) = attached.remove(tile) {
                    for handle in handles {
                        self.surface.detach(handle);
                    }
                    self.stats.tiles_detached.fetch_add(1, Ordering::Relaxed);
                    trace!(tile = %tile, "detached tile");
                }
            }
        }

        // Materialize every wanted tile that is not attached. Working from
        // the attachment registry rather than the previous wanted set
        // retries tiles that failed on earlier cycles.
        let already_attached: HashSet<TileCoord> = {
            let attached = self.attached.read().expect("attached lock poisoned");
            attached.keys().copied().collect()
        };

        for tile in wanted.iter().copied() {
            if already_attached.contains(&tile) {
                continue;
            }
            let prepared = match self.materialize(tile).await {
                Ok(prepared) => prepared,
                Err(error) => {
                    // One tile's failure must not abort the cycle; the
                    // position stays empty and is retried next cycle.
                    warn!(tile = %tile, %error, "tile materialization failed");
                    self.stats.tiles_failed.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };

            // Re-validate against the then-current wanted set: there is no
            // fetch cancellation, so completion decides attachment.
            let now = self.camera.snapshot();
            let still_wanted = coord::wanted_tiles(now.x(), now.y(), now.z(), self.expanded)
                .contains(&tile);
            if !still_wanted {
                debug!(tile = %tile, "tile no longer wanted, skipping attach");
                continue;
            }

            let transform = combined_transform(&now, tile);
            let handles: Vec<HandleId> = prepared
                .layers
                .iter()
                .map(|layer| self.surface.attach(tile, layer.name(), layer, transform))
                .collect();

            self.attached
                .write()
                .expect("attached lock poisoned")
                .insert(tile, handles);
            self.stats.tiles_attached.fetch_add(1, Ordering::Relaxed);
            trace!(tile = %tile, "attached tile");
        }

        self.wanted = wanted;
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Materialize one tile, cache-first.
    ///
    /// A cache hit short-circuits fetch + decode + resolve entirely.
    /// Failed prepares are not cached, so the next cycle retries them.
    async fn materialize(
        &self,
        tile: TileCoord,
    ) -> Result<Arc<PreparedTile>, crate::style::StyleError> {
        if let Some(hit) = self.cache.get(&tile) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }
        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        let prepared = Arc::new(self.style.prepare(self.source.as_ref(), tile).await?);
        self.cache.insert(tile, Arc::clone(&prepared));
        Ok(prepared)
    }
}

/// Continuous cadence: refresh attached tiles' transforms every display
/// frame from the latest camera snapshot, without fetching or preparing
/// anything.
pub struct TransformRefresher {
    camera: SharedCamera,
    surface: Arc<dyn OutputSurface>,
    attached: AttachedTiles,
    stats: Arc<SchedulerStats>,
    /// Per-tile placement transforms, recomputed only when the rounded
    /// camera position or discrete level changes.
    placements: HashMap<TileCoord, Transform>,
    last_rounded: Option<(i64, i64, u8)>,
}

impl TransformRefresher {
    pub(super) fn new(
        camera: SharedCamera,
        surface: Arc<dyn OutputSurface>,
        attached: AttachedTiles,
        stats: Arc<SchedulerStats>,
    ) -> Self {
        Self {
            camera,
            surface,
            attached,
            stats,
            placements: HashMap::new(),
            last_rounded: None,
        }
    }

    /// Run one refresh pass.
    pub fn refresh(&mut self) {
        let camera = self.camera.snapshot();
        let group = coord::camera_transform(camera.x(), camera.y(), camera.zoom(), camera.z());

        let rounded = (
            camera.x().round() as i64,
            camera.y().round() as i64,
            camera.z(),
        );
        if self.last_rounded != Some(rounded) {
            self.placements.clear();
            self.last_rounded = Some(rounded);
        }

        let attached = self.attached.read().expect("attached lock poisoned");
        for (tile, handles) in attached.iter() {
            let placement = *self.placements.entry(*tile).or_insert_with(|| {
                coord::tile_transform(camera.longitude(), camera.latitude(), camera.z(), *tile)
            });
            let transform = group.then(placement);
            for handle in handles {
                self.surface.set_transform(*handle, transform);
            }
        }
        // Drop placements of tiles that were detached.
        self.placements.retain(|tile, _| attached.contains_key(tile));

        self.stats.transform_refreshes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Combined screen transform for a tile: the camera group transform around
/// the tile placement, net scale `2^(zoom - tile.z)`.
pub fn combined_transform(camera: &crate::camera::Camera, tile: TileCoord) -> Transform {
    let group = coord::camera_transform(camera.x(), camera.y(), camera.zoom(), camera.z());
    let placement = coord::tile_transform(camera.longitude(), camera.latitude(), camera.z(), tile);
    group.then(placement)
}
