//! Style document model.
//!
//! The document arrives already schema-validated from the style-loader
//! collaborator; this model only captures what the engine resolves. Loaded
//! once and immutable thereafter; a new style replaces the whole document.

use super::expression::{Expression, StopsFunction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete style: named source definitions plus an ordered layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sources: HashMap<String, SourceDefinition>,
    pub layers: Vec<StyleLayer>,
}

/// Declaration of a tile source the style references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceDefinition {
    Vector {
        #[serde(default)]
        tiles: Vec<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        minzoom: Option<f64>,
        #[serde(default)]
        maxzoom: Option<f64>,
        #[serde(default)]
        attribution: Option<String>,
    },
    Raster {
        #[serde(default)]
        tiles: Vec<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default, rename = "tileSize")]
        tile_size: Option<u32>,
        #[serde(default)]
        maxzoom: Option<f64>,
        #[serde(default)]
        attribution: Option<String>,
    },
}

/// One style layer in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Source reference; absent for background layers.
    #[serde(default)]
    pub source: Option<String>,
    /// Sub-layer of the source's vector payload this layer draws from.
    #[serde(default, rename = "source-layer")]
    pub source_layer: Option<String>,
    /// Filter expression deciding which features the layer keeps.
    #[serde(default)]
    pub filter: Option<Expression>,
    #[serde(default)]
    pub minzoom: Option<f64>,
    #[serde(default)]
    pub maxzoom: Option<f64>,
    #[serde(default)]
    pub paint: HashMap<String, PaintProperty>,
    #[serde(default)]
    pub layout: HashMap<String, PaintProperty>,
}

/// Layer type tag.
///
/// Only background, fill, line and raster layers produce output; the other
/// kinds are parsed and skipped during preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Background,
    Fill,
    Line,
    Raster,
    Circle,
    Symbol,
    #[serde(other)]
    Other,
}

/// A raw paint or layout property value.
///
/// Scalars resolve to constants and `{stops: …}` objects to zoom-dependent
/// functions; anything else (full expressions, arrays) is carried opaquely
/// and left unresolved, so the output layer falls back to its own default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaintProperty {
    Bool(bool),
    Number(f64),
    Color(String),
    Stops(StopsFunction),
    Other(serde_json::Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_deserialization() {
        let json = r#"{
            "id": "water-ocean",
            "type": "fill",
            "source": "shortbread",
            "source-layer": "ocean",
            "minzoom": 4,
            "paint": { "fill-color": "rgb(190,221,243)" }
        }"#;
        let layer: StyleLayer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.kind, LayerKind::Fill);
        assert_eq!(layer.source.as_deref(), Some("shortbread"));
        assert_eq!(layer.source_layer.as_deref(), Some("ocean"));
        assert_eq!(layer.minzoom, Some(4.0));
        assert_eq!(
            layer.paint.get("fill-color"),
            Some(&PaintProperty::Color("rgb(190,221,243)".to_string()))
        );
    }

    #[test]
    fn test_stops_property_deserialization() {
        let json = r#"{ "stops": [[10, 0], [11, 1]] }"#;
        let prop: PaintProperty = serde_json::from_str(json).unwrap();
        match prop {
            PaintProperty::Stops(f) => assert_eq!(f.stops, vec![(10.0, 0.0), (11.0, 1.0)]),
            other => panic!("expected stops function, got {other:?}"),
        }
    }

    #[test]
    fn test_expression_property_is_carried_opaquely() {
        let json = r#"["interpolate", ["linear"], ["zoom"], 5, 1, 10, 4]"#;
        let prop: PaintProperty = serde_json::from_str(json).unwrap();
        assert!(matches!(prop, PaintProperty::Other(_)));
    }

    #[test]
    fn test_unknown_layer_kind_parses() {
        let json = r#"{ "id": "hills", "type": "hillshade" }"#;
        let layer: StyleLayer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.kind, LayerKind::Other);
    }

    #[test]
    fn test_document_with_sources() {
        let json = r#"{
            "name": "basic",
            "sources": {
                "shortbread": { "type": "vector", "tiles": ["https://tiles.example/{z}/{x}/{y}"] },
                "satellite": { "type": "raster", "tileSize": 512 }
            },
            "layers": [
                { "id": "background", "type": "background",
                  "paint": { "background-color": "rgb(249,244,238)" } }
            ]
        }"#;
        let doc: StyleDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.sources.len(), 2);
        assert_eq!(doc.layers[0].kind, LayerKind::Background);
        assert!(matches!(
            doc.sources.get("satellite"),
            Some(SourceDefinition::Raster {
                tile_size: Some(512),
                ..
            })
        ));
    }
}
