//! Tile source interface.
//!
//! A tile source resolves `(source name, tile coordinate)` to a raw tile.
//! Returning `Ok(None)` means "no data for this source/tile" and is not an
//! error; `Err` is a transient fetch failure the scheduler retries. Network
//! and on-wire parsing live behind this trait, outside the engine core.

mod types;

pub use types::SourceError;

use crate::coord::TileCoord;
use crate::tile::RawTile;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Asynchronous provider of raw tiles, addressed by source name and tile
/// coordinate.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch one tile for the named source.
    async fn fetch(&self, name: &str, tile: TileCoord) -> Result<Option<Arc<RawTile>>, SourceError>;
}

/// In-memory tile source serving a fixed set of tiles under one name.
///
/// Used by tests and fixture-driven tools; answers `None` for any other
/// source name or missing coordinate, like a remote source with no data.
#[derive(Debug, Default)]
pub struct StaticTileSource {
    name: String,
    tiles: HashMap<TileCoord, Arc<RawTile>>,
}

impl StaticTileSource {
    /// Create an empty source with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tiles: HashMap::new(),
        }
    }

    /// Add a tile, replacing any previous tile at the same coordinate.
    pub fn with_tile(mut self, tile: TileCoord, raw: RawTile) -> Self {
        self.tiles.insert(tile, Arc::new(raw));
        self
    }

    /// Number of tiles held.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the source holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[async_trait]
impl TileSource for StaticTileSource {
    async fn fetch(&self, name: &str, tile: TileCoord) -> Result<Option<Arc<RawTile>>, SourceError> {
        if name != self.name {
            return Ok(None);
        }
        Ok(self.tiles.get(&tile).cloned())
    }
}

/// Composite source querying several children for the same request.
///
/// All children are asked concurrently; the first tile wins. A child error
/// is surfaced only when no child produced a tile, so one flaky source
/// cannot mask data another source has.
pub struct CompositeTileSource {
    sources: Vec<Arc<dyn TileSource>>,
}

impl CompositeTileSource {
    /// Combine the given sources.
    pub fn new(sources: Vec<Arc<dyn TileSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl TileSource for CompositeTileSource {
    async fn fetch(&self, name: &str, tile: TileCoord) -> Result<Option<Arc<RawTile>>, SourceError> {
        let results =
            futures::future::join_all(self.sources.iter().map(|s| s.fetch(name, tile))).await;

        let mut first_err = None;
        for result in results {
            match result {
                Ok(Some(raw)) => return Ok(Some(raw)),
                Ok(None) => {}
                Err(err) => first_err = first_err.or(Some(err)),
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{RasterTile, VectorTile};

    fn vector_tile() -> RawTile {
        RawTile::Vector(VectorTile { layers: vec![] })
    }

    fn raster_tile(image: &str) -> RawTile {
        RawTile::Raster(RasterTile {
            image: image.to_string(),
        })
    }

    struct FailingSource;

    #[async_trait]
    impl TileSource for FailingSource {
        async fn fetch(
            &self,
            _name: &str,
            tile: TileCoord,
        ) -> Result<Option<Arc<RawTile>>, SourceError> {
            Err(SourceError::FetchFailed {
                tile,
                reason: "connection reset".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_static_source_serves_by_name_and_coordinate() {
        let coord = TileCoord::new(1, 2, 3);
        let source = StaticTileSource::new("osm").with_tile(coord, vector_tile());

        assert!(source.fetch("osm", coord).await.unwrap().is_some());
        assert!(source
            .fetch("osm", TileCoord::new(0, 0, 3))
            .await
            .unwrap()
            .is_none());
        assert!(source.fetch("satellite", coord).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_composite_source_first_tile_wins() {
        let coord = TileCoord::new(1, 2, 3);
        let empty = Arc::new(StaticTileSource::new("satellite"));
        let full = Arc::new(
            StaticTileSource::new("satellite").with_tile(coord, raster_tile("10/1/2.png")),
        );
        let composite = CompositeTileSource::new(vec![empty, full]);

        let tile = composite.fetch("satellite", coord).await.unwrap().unwrap();
        assert!(tile.as_raster().is_some());
    }

    #[tokio::test]
    async fn test_composite_source_error_does_not_mask_data() {
        let coord = TileCoord::new(1, 2, 3);
        let flaky: Arc<dyn TileSource> = Arc::new(FailingSource);
        let full: Arc<dyn TileSource> =
            Arc::new(StaticTileSource::new("osm").with_tile(coord, vector_tile()));
        let composite = CompositeTileSource::new(vec![flaky, full]);

        assert!(composite.fetch("osm", coord).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_composite_source_propagates_error_when_no_data() {
        let coord = TileCoord::new(1, 2, 3);
        let flaky: Arc<dyn TileSource> = Arc::new(FailingSource);
        let empty: Arc<dyn TileSource> = Arc::new(StaticTileSource::new("osm"));
        let composite = CompositeTileSource::new(vec![flaky, empty]);

        assert!(composite.fetch("osm", coord).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_composite_has_no_data() {
        let composite = CompositeTileSource::new(vec![]);
        let result = composite.fetch("osm", TileCoord::new(0, 0, 0)).await;
        assert!(matches!(result, Ok(None)));
    }
}
