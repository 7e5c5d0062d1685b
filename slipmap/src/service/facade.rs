//! Map service facade implementation.

use super::config::ServiceConfig;
use super::error::ServiceError;
use crate::cache::LruTileCache;
use crate::camera::{Camera, CameraMove, ScreenDimensions, SharedCamera};
use crate::scheduler::{SchedulerHandle, SchedulerStats, TileScheduler};
use crate::source::TileSource;
use crate::style::{StyleDocument, StyleEngine};
use crate::surface::OutputSurface;
use std::sync::Arc;
use tracing::info;

/// High-level facade composing the engine.
///
/// Owns the camera and the scheduler; the tile source, style document and
/// output surface are supplied by the embedding application.
///
/// # Example
///
/// ```ignore
/// let mut service = MapService::new(ServiceConfig::default(), document, source, surface);
/// service.start()?;
/// service.move_camera(CameraMove::pan_to(13.4, 52.5));
/// service.stop().await?;
/// ```
pub struct MapService {
    camera: SharedCamera,
    style: Arc<StyleEngine>,
    source: Arc<dyn TileSource>,
    surface: Arc<dyn OutputSurface>,
    scheduler: TileScheduler,
    handle: Option<SchedulerHandle>,
}

impl MapService {
    /// Wire a service from configuration and collaborators.
    pub fn new(
        config: ServiceConfig,
        document: StyleDocument,
        source: Arc<dyn TileSource>,
        surface: Arc<dyn OutputSurface>,
    ) -> Self {
        let camera = SharedCamera::new(Camera::new(config.camera));
        let cache = Arc::new(LruTileCache::new(config.cache_capacity));
        let scheduler = TileScheduler::new(config.scheduler, cache);
        Self {
            camera,
            style: Arc::new(StyleEngine::new(document)),
            source,
            surface,
            scheduler,
            handle: None,
        }
    }

    /// Snapshot of the camera state.
    pub fn camera(&self) -> Camera {
        self.camera.snapshot()
    }

    /// The resolved style engine.
    pub fn style(&self) -> &StyleEngine {
        &self.style
    }

    /// Scheduler statistics for monitoring.
    pub fn stats(&self) -> Arc<SchedulerStats> {
        self.scheduler.stats()
    }

    /// Whether the scheduling loops are running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Push the view box and background to the surface and start both
    /// scheduling loops.
    pub fn start(&mut self) -> Result<(), ServiceError> {
        if self.handle.is_some() {
            return Err(ServiceError::AlreadyRunning);
        }
        self.surface.set_view_box(self.camera.snapshot().view_box());
        self.surface.set_background(self.style.background());
        self.handle = Some(self.scheduler.start(
            self.camera.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.style),
            Arc::clone(&self.surface),
        ));
        info!("map service started");
        Ok(())
    }

    /// Stop the scheduling loops.
    pub async fn stop(&mut self) -> Result<(), ServiceError> {
        match self.handle.take() {
            Some(handle) => {
                handle.stop().await;
                info!("map service stopped");
                Ok(())
            }
            None => Err(ServiceError::NotRunning),
        }
    }

    /// Input-controller entry point: apply a partial camera move.
    ///
    /// Never fails; transient tile problems surface as empty positions,
    /// not as errors here.
    pub fn move_camera(&self, position: CameraMove) {
        self.camera.apply_move(position);
    }

    /// Input-controller entry point: the screen was resized.
    ///
    /// Recomputes the view box and tells the surface.
    pub fn resize(&self, screen: ScreenDimensions) {
        let view_box = self.camera.resize(screen);
        self.surface.set_view_box(view_box);
    }
}
