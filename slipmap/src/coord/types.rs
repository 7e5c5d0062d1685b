//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical extent of a tile in drawing-surface units.
///
/// Tile geometry is encoded against this extent; a tile layer that declares
/// a different extent is rejected during style resolution.
pub const TILE_EXTENT: u32 = 4096;

/// `TILE_EXTENT` as a float, for transform math.
pub const TILE_EXTENT_F: f64 = TILE_EXTENT as f64;

/// Continuous zoom range the camera accepts.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Discrete tile levels used for fetching.
pub const MIN_TILE_Z: u8 = 0;
pub const MAX_TILE_Z: u8 = 18;

/// Tile coordinates in the Web Mercator / slippy-map quad-tree scheme.
///
/// `2^z` tiles per axis; `(0, 0)` is the northwest corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
    /// Zoom level
    pub z: u8,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles per axis at this coordinate's zoom level.
    pub fn tiles_per_axis(&self) -> u32 {
        1u32 << self.z
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// An affine `translate(dx, dy) scale(scale)` transform for positioning a
/// drawable on the output surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            scale: 1.0,
        }
    }

    /// Combine with a child transform applied before `self`.
    ///
    /// Equivalent to nesting the child inside a group carrying `self`, as
    /// the output surface would with a camera group around per-tile
    /// elements.
    pub fn then(&self, inner: Transform) -> Transform {
        Transform {
            dx: self.dx + self.scale * inner.dx,
            dy: self.dy + self.scale * inner.dy,
            scale: self.scale * inner.scale,
        }
    }
}
