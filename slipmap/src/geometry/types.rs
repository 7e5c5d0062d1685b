//! Decoded geometry types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point delta in tile-extent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One structured path command.
///
/// All coordinates are deltas from the cursor position left by the previous
/// command. `ClosePath` closes the current sub-path without moving the
/// cursor; `Reset` returns the cursor to the tile origin and starts an
/// independent sub-path (used when merging several features into one
/// command sequence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo { x: i32, y: i32 },
    LineTo { points: Vec<Point> },
    ClosePath,
    Reset,
}

/// Geometry kind a decoded command sequence represents.
///
/// Fill layers accept only `Polygon`, line layers only `LineString`; the
/// style engine filters mismatches, not the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    LineString,
    Polygon,
}

/// Decoded geometry of one feature (or of several merged features).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedGeometry {
    pub kind: GeometryKind,
    pub commands: Vec<PathCommand>,
}

/// Errors raised for malformed command streams.
///
/// These indicate a corrupt tile: the affected tile is reported
/// unavailable rather than partially drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Command integer with an unrecognized low-3-bits value.
    #[error("unknown geometry command type {0}")]
    UnknownCommand(u32),
    /// Stream ended before the declared coordinate pairs.
    #[error("geometry stream truncated at offset {offset}")]
    TruncatedStream { offset: usize },
}
