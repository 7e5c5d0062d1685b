//! Camera state and viewport geometry.
//!
//! The camera holds the continuous map position (longitude, latitude,
//! zoom) and every field derived from it: the fractional tile coordinates
//! at the current discrete level, the discrete fetch level itself, and the
//! view box mapping the screen onto drawing-surface units. All mutation
//! funnels through a single recompute step, so readers can never observe
//! the derived fields out of sync with the position.

mod types;

pub use types::{CameraMove, CameraOptions, ScreenDimensions, ScreenPoint, ViewBox, ZoomBounds};

use crate::coord::{self, TILE_EXTENT_F};
use std::sync::{Arc, RwLock};

/// Mutable viewport state with invariant-maintained derived fields.
///
/// Created once per map instance; mutated only through [`Camera::apply_move`]
/// and [`Camera::resize`].
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    longitude: f64,
    latitude: f64,
    zoom: f64,
    x: f64,
    y: f64,
    z: u8,
    screen: ScreenDimensions,
    view_box: ViewBox,
    bounds: ZoomBounds,
}

impl Camera {
    /// Create a camera from options, clamping zoom and deriving the rest.
    pub fn new(options: CameraOptions) -> Self {
        let mut camera = Self {
            longitude: options.longitude,
            latitude: options.latitude,
            zoom: options.zoom,
            x: 0.0,
            y: 0.0,
            z: 0,
            screen: options.screen,
            view_box: view_box_for_screen(options.screen),
            bounds: options.bounds,
        };
        camera.recompute();
        camera
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Continuous zoom, clamped to the configured zoom range.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Fractional tile x coordinate at the discrete level [`Camera::z`].
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Fractional tile y coordinate at the discrete level [`Camera::z`].
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Discrete tile level used for fetching: `zoom` rounded, then clamped
    /// to the configured tile-level range.
    pub fn z(&self) -> u8 {
        self.z
    }

    /// Current screen dimensions in pixels.
    pub fn screen(&self) -> ScreenDimensions {
        self.screen
    }

    /// Logical drawing-surface box covering the screen.
    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    /// Zoom and tile-level bounds in effect.
    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    /// Merge a partial position update and re-derive every dependent field.
    ///
    /// Unspecified fields retain their prior value; zoom is re-clamped.
    /// Idempotent given identical inputs, and a no-op for an empty move.
    pub fn apply_move(&mut self, position: CameraMove) {
        self.longitude = position.longitude.unwrap_or(self.longitude);
        self.latitude = position.latitude.unwrap_or(self.latitude);
        self.zoom = position.zoom.unwrap_or(self.zoom);
        self.recompute();
    }

    /// Update the screen dimensions, recomputing the view box only.
    pub fn resize(&mut self, screen: ScreenDimensions) {
        self.screen = screen;
        self.view_box = view_box_for_screen(screen);
    }

    /// Map a screen pixel position to fractional tile coordinates at the
    /// camera's discrete level.
    ///
    /// The pixel is first mapped into view-box units, then into tile
    /// fractions around the camera using the continuous scale factor
    /// `2^(zoom - z)`.
    pub fn screen_to_tile(&self, point: ScreenPoint) -> (f64, f64) {
        let sx = point.x / self.screen.width * self.view_box.width + self.view_box.x;
        let sy = point.y / self.screen.height * self.view_box.height + self.view_box.y;
        let scale = 2.0_f64.powf(self.zoom - self.z as f64);
        let x = self.x + (sx - TILE_EXTENT_F / 2.0) / (TILE_EXTENT_F * scale);
        let y = self.y + (sy - TILE_EXTENT_F / 2.0) / (TILE_EXTENT_F * scale);
        (x, y)
    }

    /// Re-derive `zoom` clamping, `z`, and the fractional tile position.
    ///
    /// Invariant: `(x, y, z)` are always recomputed together from
    /// `(longitude, latitude, zoom)`, never independently mutated.
    fn recompute(&mut self) {
        self.zoom = self.zoom.clamp(self.bounds.min_zoom, self.bounds.max_zoom);
        self.z = (self.zoom.round() as i64)
            .clamp(self.bounds.min_tile_z as i64, self.bounds.max_tile_z as i64) as u8;
        let (x, y) = coord::coordinates_to_tile(self.longitude, self.latitude, self.z);
        self.x = x;
        self.y = y;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraOptions::default())
    }
}

/// Compute the logical view box for a screen.
///
/// The longer screen dimension maps to the full tile extent (4096 units);
/// the shorter dimension is scaled proportionally and centered with
/// padding. A degenerate screen (zero-sized axis) gets the full square box.
pub fn view_box_for_screen(screen: ScreenDimensions) -> ViewBox {
    if screen.width <= 0.0 || screen.height <= 0.0 {
        return ViewBox {
            x: 0.0,
            y: 0.0,
            width: TILE_EXTENT_F,
            height: TILE_EXTENT_F,
        };
    }
    let width = if screen.width > screen.height {
        TILE_EXTENT_F
    } else {
        screen.width / screen.height * TILE_EXTENT_F
    };
    let height = if screen.height > screen.width {
        TILE_EXTENT_F
    } else {
        screen.height / screen.width * TILE_EXTENT_F
    };
    ViewBox {
        x: if width < TILE_EXTENT_F {
            (TILE_EXTENT_F - width) / 2.0
        } else {
            0.0
        },
        y: if height < TILE_EXTENT_F {
            (TILE_EXTENT_F - height) / 2.0
        } else {
            0.0
        },
        width,
        height,
    }
}

/// Shared handle to a camera, safe to mutate from input-event callbacks
/// while the scheduling loops read it.
///
/// Readers always take whole-struct snapshots, so a fully-updated
/// `(longitude, latitude, zoom, x, y, z)` tuple is observed, never a
/// partial update.
#[derive(Debug, Clone)]
pub struct SharedCamera {
    inner: Arc<RwLock<Camera>>,
}

impl SharedCamera {
    /// Wrap a camera for shared access.
    pub fn new(camera: Camera) -> Self {
        Self {
            inner: Arc::new(RwLock::new(camera)),
        }
    }

    /// Copy of the full camera state.
    pub fn snapshot(&self) -> Camera {
        *self.inner.read().expect("camera lock poisoned")
    }

    /// Apply a partial position update.
    pub fn apply_move(&self, position: CameraMove) {
        self.inner
            .write()
            .expect("camera lock poisoned")
            .apply_move(position);
    }

    /// Update the screen dimensions; returns the recomputed view box so the
    /// caller can forward it to the output surface.
    pub fn resize(&self, screen: ScreenDimensions) -> ViewBox {
        let mut camera = self.inner.write().expect("camera lock poisoned");
        camera.resize(screen);
        camera.view_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn berlin_camera() -> Camera {
        Camera::new(CameraOptions {
            longitude: 13.4,
            latitude: 52.5,
            zoom: 10.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_move_is_identity() {
        let mut camera = berlin_camera();
        let before = camera;
        camera.apply_move(CameraMove::default());
        assert_eq!(camera.longitude(), before.longitude());
        assert_eq!(camera.latitude(), before.latitude());
        assert_eq!(camera.zoom(), before.zoom());
        assert_eq!(camera.x(), before.x());
        assert_eq!(camera.y(), before.y());
        assert_eq!(camera.z(), before.z());
    }

    #[test]
    fn test_partial_move_merges_fields() {
        let mut camera = berlin_camera();
        camera.apply_move(CameraMove {
            zoom: Some(12.0),
            ..Default::default()
        });
        assert_eq!(camera.longitude(), 13.4);
        assert_eq!(camera.latitude(), 52.5);
        assert_eq!(camera.zoom(), 12.0);
        assert_eq!(camera.z(), 12);
    }

    #[test]
    fn test_zoom_clamped_to_bounds() {
        let mut camera = berlin_camera();
        camera.apply_move(CameraMove {
            zoom: Some(99.0),
            ..Default::default()
        });
        assert_eq!(camera.zoom(), camera.bounds().max_zoom);

        camera.apply_move(CameraMove {
            zoom: Some(-5.0),
            ..Default::default()
        });
        assert_eq!(camera.zoom(), camera.bounds().min_zoom);
    }

    #[test]
    fn test_discrete_level_rounds_then_clamps() {
        let mut camera = Camera::new(CameraOptions {
            zoom: 10.4,
            bounds: ZoomBounds {
                min_tile_z: 2,
                max_tile_z: 14,
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(camera.z(), 10);

        camera.apply_move(CameraMove {
            zoom: Some(10.5),
            ..Default::default()
        });
        assert_eq!(camera.z(), 11, "half zoom levels round up");

        camera.apply_move(CameraMove {
            zoom: Some(0.0),
            ..Default::default()
        });
        assert_eq!(camera.z(), 2, "discrete level clamps to min_tile_z");

        camera.apply_move(CameraMove {
            zoom: Some(22.0),
            ..Default::default()
        });
        assert_eq!(camera.z(), 14, "discrete level clamps to max_tile_z");
    }

    #[test]
    fn test_derived_position_tracks_moves() {
        let mut camera = Camera::default();
        assert_approx_eq!(camera.x(), 0.5);
        assert_approx_eq!(camera.y(), 0.5);

        camera.apply_move(CameraMove {
            longitude: Some(-180.0),
            latitude: Some(0.0),
            zoom: Some(3.0),
        });
        assert_approx_eq!(camera.x(), 0.0);
        assert_approx_eq!(camera.y(), 4.0);
    }

    #[test]
    fn test_resize_leaves_position_untouched() {
        let mut camera = berlin_camera();
        let (x, y, z) = (camera.x(), camera.y(), camera.z());
        camera.resize(ScreenDimensions {
            width: 1920.0,
            height: 1080.0,
        });
        assert_eq!(camera.x(), x);
        assert_eq!(camera.y(), y);
        assert_eq!(camera.z(), z);
        assert_eq!(camera.view_box().width, 4096.0);
    }

    #[test]
    fn test_view_box_landscape() {
        let vb = view_box_for_screen(ScreenDimensions {
            width: 800.0,
            height: 400.0,
        });
        assert_approx_eq!(vb.width, 4096.0);
        assert_approx_eq!(vb.height, 2048.0);
        assert_approx_eq!(vb.x, 0.0);
        assert_approx_eq!(vb.y, 1024.0);
    }

    #[test]
    fn test_view_box_portrait() {
        let vb = view_box_for_screen(ScreenDimensions {
            width: 400.0,
            height: 800.0,
        });
        assert_approx_eq!(vb.width, 2048.0);
        assert_approx_eq!(vb.height, 4096.0);
        assert_approx_eq!(vb.x, 1024.0);
        assert_approx_eq!(vb.y, 0.0);
    }

    #[test]
    fn test_view_box_square() {
        let vb = view_box_for_screen(ScreenDimensions {
            width: 512.0,
            height: 512.0,
        });
        assert_approx_eq!(vb.width, 4096.0);
        assert_approx_eq!(vb.height, 4096.0);
        assert_approx_eq!(vb.x, 0.0);
        assert_approx_eq!(vb.y, 0.0);
    }

    #[test]
    fn test_screen_center_maps_to_camera_position() {
        let camera = berlin_camera();
        let screen = camera.screen();
        let (x, y) = camera.screen_to_tile(ScreenPoint {
            x: screen.width / 2.0,
            y: screen.height / 2.0,
        });
        assert_approx_eq!(x, camera.x());
        assert_approx_eq!(y, camera.y());
    }

    #[test]
    fn test_screen_to_tile_scales_with_continuous_zoom() {
        let mut camera = berlin_camera();
        let corner = ScreenPoint { x: 0.0, y: 0.0 };
        let (x0, _) = camera.screen_to_tile(corner);
        let offset0 = camera.x() - x0;

        // Zooming in continuously (same discrete level) shrinks the tile
        // span covered by the same screen distance.
        camera.apply_move(CameraMove {
            zoom: Some(camera.zoom() + 0.4),
            ..Default::default()
        });
        let (x1, _) = camera.screen_to_tile(corner);
        let offset1 = camera.x() - x1;
        assert!(offset1 < offset0);
        assert_eq!(camera.z(), 10);
    }

    #[test]
    fn test_shared_camera_snapshot_is_consistent() {
        let shared = SharedCamera::new(berlin_camera());
        shared.apply_move(CameraMove {
            longitude: Some(2.35),
            latitude: Some(48.86),
            zoom: Some(12.0),
        });
        let snap = shared.snapshot();
        let (x, y) = coord::coordinates_to_tile(2.35, 48.86, snap.z());
        assert_eq!(snap.x(), x);
        assert_eq!(snap.y(), y);
        assert_eq!(snap.z(), 12);
    }
}
