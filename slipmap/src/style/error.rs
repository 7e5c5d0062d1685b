//! Style resolution error types.

use crate::geometry::GeometryError;
use crate::source::SourceError;
use thiserror::Error;

/// Errors raised while resolving a style against a tile.
///
/// Configuration errors (unsupported extent or expression form) indicate a
/// style/source mismatch and should surface loudly during development.
/// Wrapped source errors are transient; the scheduler retries the tile on
/// a later cycle.
#[derive(Debug, Error)]
pub enum StyleError {
    /// Tile layer encoded against an extent the engine does not rescale.
    #[error("tile layer '{layer}' has extent {extent}, expected {expected}")]
    UnsupportedExtent {
        layer: String,
        extent: u32,
        expected: u32,
    },

    /// Filter uses an operator the engine does not implement.
    #[error("unsupported filter operator '{0}'")]
    UnsupportedExpression(String),

    /// Filter expression is structurally malformed.
    #[error("invalid filter expression: {0}")]
    InvalidExpression(String),

    /// A feature's geometry stream failed to decode.
    #[error("geometry decode failed: {0}")]
    Geometry(#[from] GeometryError),

    /// Fetching a referenced source failed.
    #[error("source fetch failed: {0}")]
    Source(#[from] SourceError),
}
