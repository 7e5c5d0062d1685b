//! Raw tile data model.
//!
//! A raw tile is what the tile-source collaborator hands the engine: either
//! a vector payload (named layers of tagged features with encoded command
//! streams) or a raster payload (an image reference). Parsing the on-wire
//! protobuf into this model is the source's concern; everything in the
//! engine consumes this decoded form. The whole family derives serde so
//! fixtures and tests can use the JSON representation.

use serde::{Deserialize, Serialize};

/// One fetched tile, immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawTile {
    /// Vector payload: named layers of features.
    Vector(VectorTile),
    /// Raster payload: an image reference to be placed as-is.
    Raster(RasterTile),
}

impl RawTile {
    /// The vector payload, if this is a vector tile.
    pub fn as_vector(&self) -> Option<&VectorTile> {
        match self {
            RawTile::Vector(tile) => Some(tile),
            RawTile::Raster(_) => None,
        }
    }

    /// The raster payload, if this is a raster tile.
    pub fn as_raster(&self) -> Option<&RasterTile> {
        match self {
            RawTile::Raster(tile) => Some(tile),
            RawTile::Vector(_) => None,
        }
    }
}

/// Vector tile: a set of named layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorTile {
    pub layers: Vec<VectorLayer>,
}

impl VectorTile {
    /// Find a layer by name.
    pub fn layer(&self, name: &str) -> Option<&VectorLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }
}

/// Raster tile: an image reference plus its source size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterTile {
    /// Image URI; the output surface resolves and draws it.
    pub image: String,
}

/// One named layer inside a vector tile.
///
/// Feature properties are stored as parallel `keys`/`values` tables; each
/// feature's `tags` index into them pairwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorLayer {
    pub name: String,
    /// Coordinate extent the geometry is encoded against.
    pub extent: u32,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub values: Vec<TagValue>,
    #[serde(default)]
    pub features: Vec<VectorFeature>,
}

impl VectorLayer {
    /// Look up a feature's property value by key name.
    ///
    /// Resolves the key against the layer's key table, then scans the
    /// feature's tag pairs for a matching key index. Returns `None` when
    /// the key is unknown to the layer, the feature does not carry it, or a
    /// tag pair is malformed (dangling key index).
    pub fn feature_property(&self, feature: &VectorFeature, key: &str) -> Option<&TagValue> {
        let key_index = self.keys.iter().position(|k| k == key)? as u32;
        feature
            .tags
            .chunks_exact(2)
            .find(|pair| pair[0] == key_index)
            .and_then(|pair| self.values.get(pair[1] as usize))
    }
}

/// One feature: a geometry-type tag, packed property tags, and the encoded
/// geometry command stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorFeature {
    #[serde(default)]
    pub id: Option<u64>,
    /// Key-index/value-index pairs into the layer's tag tables.
    #[serde(default)]
    pub tags: Vec<u32>,
    #[serde(rename = "type")]
    pub geom_type: GeomType,
    /// Encoded command stream; see [`crate::geometry`].
    pub geometry: Vec<u32>,
}

/// Declared geometry type of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeomType {
    Unknown,
    Point,
    LineString,
    Polygon,
}

/// A typed feature property value.
///
/// The wire format distinguishes more numeric widths; sources collapse
/// them into this decoded set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}
