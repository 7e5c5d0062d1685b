//! Source error types.

use crate::coord::TileCoord;
use thiserror::Error;

/// Errors that can occur while fetching raw tiles.
///
/// These are transient from the engine's point of view: the affected tile
/// is treated as temporarily absent and retried on a later cycle while it
/// is still wanted.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The underlying transport failed.
    #[error("tile fetch failed for {tile}: {reason}")]
    FetchFailed { tile: TileCoord, reason: String },

    /// The payload could not be decoded into a raw tile.
    #[error("invalid tile payload for {tile}: {reason}")]
    InvalidPayload { tile: TileCoord, reason: String },

    /// I/O error from a local source.
    #[error("tile source I/O error: {0}")]
    Io(#[from] std::io::Error),
}
