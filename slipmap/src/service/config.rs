//! Service configuration.

use crate::cache::DEFAULT_CAPACITY;
use crate::camera::CameraOptions;
use crate::scheduler::SchedulerConfig;

/// Configuration for a [`MapService`](super::MapService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Initial camera position and bounds.
    pub camera: CameraOptions,
    /// Scheduler cadences and prefetch mode.
    pub scheduler: SchedulerConfig,
    /// Prepared-tile cache capacity in entries.
    pub cache_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            camera: CameraOptions::default(),
            scheduler: SchedulerConfig::default(),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// Set the initial camera options.
    pub fn with_camera(mut self, camera: CameraOptions) -> Self {
        self.camera = camera;
        self
    }

    /// Set the scheduler configuration.
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the prepared-tile cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}
