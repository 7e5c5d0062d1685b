//! Style resolution engine.
//!
//! Resolves an immutable style document against one fetched tile: selects
//! the layers that apply at the tile's level, filters features with the
//! style's filter expressions, decodes and merges the surviving geometry,
//! and resolves every paint/layout property to a constant or a
//! zoom-dependent function. The output is a renderer-agnostic
//! [`PreparedTile`].

mod document;
mod error;
mod expression;
mod prepared;

pub use document::{LayerKind, PaintProperty, SourceDefinition, StyleDocument, StyleLayer};
pub use error::StyleError;
pub use expression::{evaluate, stops, EvalValue, Expression, FilterContext, StopsFunction};
pub use prepared::{
    PreparedLayer, PreparedRasterLayer, PreparedShapeLayer, PreparedTile, ResolvedProperties,
    ResolvedValue, StyleValue,
};

use crate::coord::{TileCoord, TILE_EXTENT};
use crate::geometry::{decode_feature, DecodedGeometry, GeometryKind, PathCommand};
use crate::source::TileSource;
use crate::tile::{RawTile, VectorLayer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Resolves one style document against tiles.
///
/// The document is fixed for the engine's lifetime; replacing the style
/// means building a new engine (and discarding any prepared-tile cache
/// keyed against the old one).
#[derive(Debug)]
pub struct StyleEngine {
    document: StyleDocument,
}

impl StyleEngine {
    /// Create an engine for a loaded style document.
    pub fn new(document: StyleDocument) -> Self {
        Self { document }
    }

    /// The underlying document.
    pub fn document(&self) -> &StyleDocument {
        &self.document
    }

    /// The background color, from the document's background layer.
    ///
    /// Handled once by the output surface rather than per tile.
    pub fn background(&self) -> Option<&str> {
        self.document
            .layers
            .iter()
            .find(|layer| layer.kind == LayerKind::Background)
            .and_then(|layer| match layer.paint.get("background-color") {
                Some(PaintProperty::Color(color)) => Some(color.as_str()),
                _ => None,
            })
    }

    /// Style layer ids in document order (background excluded), for output
    /// surfaces that group drawables per layer.
    pub fn layer_names(&self) -> Vec<&str> {
        self.document
            .layers
            .iter()
            .filter(|layer| layer.kind != LayerKind::Background)
            .map(|layer| layer.id.as_str())
            .collect()
    }

    /// Produce the prepared tile for one coordinate.
    ///
    /// Each referenced source is fetched at most once per call. A source
    /// fetch error aborts the whole prepare (callers must not cache the
    /// result), while "no data" (`None`) just omits the layers drawing
    /// from that source. Configuration errors (unsupported extent or
    /// filter form) also abort; they indicate a style/source mismatch.
    pub async fn prepare(
        &self,
        source: &dyn TileSource,
        tile: TileCoord,
    ) -> Result<PreparedTile, StyleError> {
        let mut fetched: HashMap<String, Option<Arc<RawTile>>> = HashMap::new();
        let mut prepared = PreparedTile::default();

        for layer in &self.document.layers {
            if layer.kind == LayerKind::Background {
                continue;
            }
            if layer.minzoom.is_some_and(|minzoom| minzoom > tile.z as f64) {
                continue;
            }
            if layer.maxzoom.is_some_and(|maxzoom| maxzoom < tile.z as f64) {
                continue;
            }
            let Some(source_name) = layer.source.as_deref() else {
                continue;
            };

            if !fetched.contains_key(source_name) {
                let raw = source.fetch(source_name, tile).await?;
                fetched.insert(source_name.to_string(), raw);
            }
            let Some(raw) = fetched[source_name].clone() else {
                trace!(layer = %layer.id, source = source_name, tile = %tile, "source has no data, omitting layer");
                continue;
            };

            match layer.kind {
                LayerKind::Fill => {
                    if let Some(shape) = self.prepare_shape(layer, &raw, GeometryKind::Polygon)? {
                        prepared.layers.push(PreparedLayer::Fill(shape));
                    }
                }
                LayerKind::Line => {
                    if let Some(shape) = self.prepare_shape(layer, &raw, GeometryKind::LineString)? {
                        prepared.layers.push(PreparedLayer::Line(shape));
                    }
                }
                LayerKind::Raster => {
                    if let Some(raster) = raw.as_raster() {
                        prepared.layers.push(PreparedLayer::Raster(PreparedRasterLayer {
                            name: layer.id.clone(),
                            image: raster.image.clone(),
                        }));
                    }
                }
                // Background handled above; the remaining kinds produce no
                // drawables.
                _ => {}
            }
        }

        Ok(prepared)
    }

    /// Prepare a fill or line layer against a vector payload.
    ///
    /// Returns `Ok(None)` when the payload is not vector data or the named
    /// source-layer is absent; the layer is silently omitted.
    fn prepare_shape(
        &self,
        layer: &StyleLayer,
        raw: &RawTile,
        accept: GeometryKind,
    ) -> Result<Option<PreparedShapeLayer>, StyleError> {
        let Some(vector) = raw.as_vector() else {
            return Ok(None);
        };
        let Some(name) = layer.source_layer.as_deref() else {
            return Ok(None);
        };
        let Some(tile_layer) = vector.layer(name) else {
            return Ok(None);
        };
        if tile_layer.extent != TILE_EXTENT {
            return Err(StyleError::UnsupportedExtent {
                layer: tile_layer.name.clone(),
                extent: tile_layer.extent,
                expected: TILE_EXTENT,
            });
        }

        let geometry = assemble_geometry(layer, tile_layer, accept)?;
        Ok(Some(PreparedShapeLayer {
            name: layer.id.clone(),
            geometry,
            paint: resolve_properties(&layer.paint),
            layout: resolve_properties(&layer.layout),
        }))
    }
}

/// Decode, filter and merge a tile layer's features into one command
/// sequence, inserting `Reset` markers between features.
fn assemble_geometry(
    layer: &StyleLayer,
    tile_layer: &VectorLayer,
    accept: GeometryKind,
) -> Result<DecodedGeometry, StyleError> {
    let mut merged = DecodedGeometry {
        kind: accept,
        commands: Vec::new(),
    };
    for feature in &tile_layer.features {
        if let Some(filter) = &layer.filter {
            let context = FilterContext::new(tile_layer, feature);
            if !evaluate(filter, context)?.is_truthy() {
                continue;
            }
        }
        let Some(decoded) = decode_feature(feature)? else {
            continue;
        };
        if decoded.kind != accept {
            continue;
        }
        if !merged.commands.is_empty() {
            merged.commands.push(PathCommand::Reset);
        }
        merged.commands.extend(decoded.commands);
    }
    Ok(merged)
}

/// Resolve a raw property map: scalars become constants, stop functions
/// become dynamic values, anything else stays unresolved (absent).
fn resolve_properties(properties: &HashMap<String, PaintProperty>) -> ResolvedProperties {
    let mut resolved = ResolvedProperties::new();
    for (key, property) in properties {
        let value = match property {
            PaintProperty::Bool(b) => ResolvedValue::Constant(StyleValue::Bool(*b)),
            PaintProperty::Number(n) => ResolvedValue::Constant(StyleValue::Number(*n)),
            PaintProperty::Color(s) => ResolvedValue::Constant(StyleValue::String(s.clone())),
            PaintProperty::Stops(f) => ResolvedValue::Dynamic(f.clone()),
            PaintProperty::Other(_) => continue,
        };
        resolved.insert(key.clone(), value);
    }
    resolved
}
