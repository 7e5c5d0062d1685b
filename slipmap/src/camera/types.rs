//! Camera option and viewport types.

use crate::coord::{MAX_TILE_Z, MAX_ZOOM, MIN_TILE_Z, MIN_ZOOM};

/// Zoom and tile-level bounds for a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    /// Minimum continuous zoom.
    pub min_zoom: f64,
    /// Maximum continuous zoom.
    pub max_zoom: f64,
    /// Minimum discrete tile level used for fetching.
    pub min_tile_z: u8,
    /// Maximum discrete tile level used for fetching.
    pub max_tile_z: u8,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            min_tile_z: MIN_TILE_Z,
            max_tile_z: MAX_TILE_Z,
        }
    }
}

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenDimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenDimensions {
    fn default() -> Self {
        Self {
            width: 512.0,
            height: 512.0,
        }
    }
}

/// A pixel position on the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Logical drawing-surface box covering the screen.
///
/// The longer screen dimension spans the full tile extent; the shorter one
/// is centered inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Initial camera configuration.
#[derive(Debug, Clone, Copy)]
pub struct CameraOptions {
    /// Initial longitude in degrees.
    pub longitude: f64,
    /// Initial latitude in degrees.
    pub latitude: f64,
    /// Initial continuous zoom.
    pub zoom: f64,
    /// Initial screen dimensions.
    pub screen: ScreenDimensions,
    /// Zoom and tile-level bounds.
    pub bounds: ZoomBounds,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            zoom: 0.0,
            screen: ScreenDimensions::default(),
            bounds: ZoomBounds::default(),
        }
    }
}

/// Partial position update for [`Camera::apply_move`](super::Camera::apply_move).
///
/// Each field is independently optional; `None` retains the prior value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraMove {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub zoom: Option<f64>,
}

impl CameraMove {
    /// A move that only changes the zoom.
    pub fn zoom_to(zoom: f64) -> Self {
        Self {
            zoom: Some(zoom),
            ..Default::default()
        }
    }

    /// A move that only changes the position.
    pub fn pan_to(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude: Some(longitude),
            latitude: Some(latitude),
            zoom: None,
        }
    }
}
