//! Directory-backed tile source.
//!
//! Serves JSON-encoded raw tiles from a fixture directory laid out as
//! `{root}/{z}/{x}/{y}.json`. A missing file is "no data"; a file that
//! fails to parse is an invalid payload error.

use async_trait::async_trait;
use slipmap::coord::TileCoord;
use slipmap::source::{SourceError, TileSource};
use slipmap::tile::RawTile;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Tile source reading JSON fixtures from disk for one source name.
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    name: String,
    root: PathBuf,
}

impl DirectoryTileSource {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    fn path_for(&self, tile: TileCoord) -> PathBuf {
        self.root
            .join(tile.z.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.json", tile.y))
    }
}

#[async_trait]
impl TileSource for DirectoryTileSource {
    async fn fetch(&self, name: &str, tile: TileCoord) -> Result<Option<Arc<RawTile>>, SourceError> {
        if name != self.name {
            return Ok(None);
        }
        let path = self.path_for(tile);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(tile = %tile, path = %path.display(), "no fixture for tile");
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };
        let raw: RawTile =
            serde_json::from_slice(&bytes).map_err(|error| SourceError::InvalidPayload {
                tile,
                reason: error.to_string(),
            })?;
        Ok(Some(Arc::new(raw)))
    }
}
