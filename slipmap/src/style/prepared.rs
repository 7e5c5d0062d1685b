//! Prepared tile types: the style-resolved, renderer-agnostic output.

use super::expression::StopsFunction;
use crate::geometry::DecodedGeometry;
use std::collections::HashMap;

/// A scalar style value after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl StyleValue {
    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A resolved paint or layout value: either a constant or a zoom-dependent
/// function, never a raw expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Constant(StyleValue),
    Dynamic(StopsFunction),
}

impl ResolvedValue {
    /// The value at a given zoom.
    pub fn resolve(&self, zoom: f64) -> StyleValue {
        match self {
            ResolvedValue::Constant(value) => value.clone(),
            ResolvedValue::Dynamic(f) => StyleValue::Number(f.resolve(zoom)),
        }
    }
}

/// Resolved properties keyed by property name; absent keys are undefined
/// and the output layer applies its own default.
pub type ResolvedProperties = HashMap<String, ResolvedValue>;

/// One prepared layer of a tile.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedLayer {
    Fill(PreparedShapeLayer),
    Line(PreparedShapeLayer),
    Raster(PreparedRasterLayer),
}

impl PreparedLayer {
    /// The style layer id this prepared layer came from.
    pub fn name(&self) -> &str {
        match self {
            PreparedLayer::Fill(layer) | PreparedLayer::Line(layer) => &layer.name,
            PreparedLayer::Raster(layer) => &layer.name,
        }
    }
}

/// Geometry plus resolved properties for a fill or line layer.
///
/// The geometry merges every surviving feature into one command sequence
/// with `Reset` markers between features, so the renderer treats them as
/// independent sub-paths sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedShapeLayer {
    pub name: String,
    pub geometry: DecodedGeometry,
    pub paint: ResolvedProperties,
    pub layout: ResolvedProperties,
}

/// A raster layer passes the tile's image reference through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRasterLayer {
    pub name: String,
    pub image: String,
}

/// Output of the style resolution engine for one tile coordinate: prepared
/// layers in style-document order. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedTile {
    pub layers: Vec<PreparedLayer>,
}

impl PreparedTile {
    /// Find a prepared layer by style layer id.
    pub fn layer(&self, name: &str) -> Option<&PreparedLayer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    /// Whether the tile prepared no layers at all.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
