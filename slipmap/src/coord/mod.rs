//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates
//! (longitude/latitude), fractional Web Mercator tile coordinates, and the
//! transforms that position tiles on the drawing surface.

mod types;

pub use types::{
    TileCoord, Transform, MAX_TILE_Z, MAX_ZOOM, MIN_TILE_Z, MIN_ZOOM, TILE_EXTENT, TILE_EXTENT_F,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to fractional tile coordinates.
///
/// Standard spherical Web Mercator: `x = (lon+180)/360 * 2^z`,
/// `y = (1 - ln(tan(lat) + sec(lat))/pi)/2 * 2^z`. The integer parts index
/// the containing tile; the fractional parts locate the point within it.
///
/// Latitude must lie strictly inside (-90, 90): the projection is undefined
/// at the poles and this function does not guard against them.
#[inline]
pub fn coordinates_to_tile(longitude: f64, latitude: f64, z: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(z as i32);
    let x = (longitude + 180.0) / 360.0 * n;
    let lat_rad = latitude.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;
    (x, y)
}

/// Converts fractional tile coordinates back to geographic coordinates.
///
/// Inverse of [`coordinates_to_tile`]; integer inputs yield the northwest
/// corner of the tile.
#[inline]
pub fn tile_to_coordinates(x: f64, y: f64, z: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(z as i32);
    let longitude = x / n * 360.0 - 180.0;
    let latitude = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    (longitude, latitude)
}

/// Computes the set of tiles the scheduler should have materialized for a
/// camera at fractional position `(x, y)` on level `z`.
///
/// Expanded mode returns the 3x3 grid of tiles centered on the tile
/// containing the camera, for background prefetch. Non-expanded mode
/// returns the up-to-4 tiles around the viewport center crossing
/// (`round(x)` and `round(x) - 1` on each axis), for finer-grained diffing.
/// Both modes clip to the valid range `[0, 2^z)`, so coordinates outside
/// the world are never produced.
pub fn wanted_tiles(x: f64, y: f64, z: u8, expanded: bool) -> Vec<TileCoord> {
    let n = 1i64 << z;

    if expanded {
        let cx = x.floor() as i64;
        let cy = y.floor() as i64;
        let mut tiles = Vec::with_capacity(9);
        for i in (cx - 1).max(0)..(cx + 2).min(n) {
            for j in (cy - 1).max(0)..(cy + 2).min(n) {
                tiles.push(TileCoord::new(i as u32, j as u32, z));
            }
        }
        return tiles;
    }

    let rx = x.round() as i64;
    let ry = y.round() as i64;
    let mut tiles = Vec::with_capacity(4);
    for i in [rx, rx - 1] {
        for j in [ry, ry - 1] {
            if (0..n).contains(&i) && (0..n).contains(&j) {
                tiles.push(TileCoord::new(i as u32, j as u32, z));
            }
        }
    }
    tiles
}

/// Continuous-cadence transform for the group holding every visible tile.
///
/// `x` and `y` are the camera's fractional tile coordinates at discrete
/// level `z`; `zoom` is the continuous zoom. The scale factor
/// `2^(zoom - z)` keeps pan/zoom fluid between discrete level changes, and
/// the translation centers the sub-tile fraction in the view box.
pub fn camera_transform(x: f64, y: f64, zoom: f64, z: u8) -> Transform {
    let scale = 2.0_f64.powf(zoom - z as f64);
    Transform {
        dx: -(x - x.round()) * TILE_EXTENT_F * scale + 0.5 * TILE_EXTENT_F,
        dy: -(y - y.round()) * TILE_EXTENT_F * scale + 0.5 * TILE_EXTENT_F,
        scale,
    }
}

/// Per-tile placement transform, relative to the camera group.
///
/// The camera is projected at the *tile's* level so tiles from a previous
/// discrete level stay correctly positioned (scaled by
/// `2^(camera_z - tile.z)`) while their replacements load.
pub fn tile_transform(longitude: f64, latitude: f64, camera_z: u8, tile: TileCoord) -> Transform {
    let (cam_x, cam_y) = coordinates_to_tile(longitude, latitude, tile.z);
    let scale = 2.0_f64.powi(camera_z as i32 - tile.z as i32);
    Transform {
        dx: (tile.x as f64 * scale - (cam_x * scale).round()) * TILE_EXTENT_F,
        dy: (tile.y as f64 * scale - (cam_y * scale).round()) * TILE_EXTENT_F,
        scale,
    }
}
