//! SVG output surface.
//!
//! Reference implementation of the engine's output interface: prepared
//! layers become `<path>` and `<image>` elements grouped per style layer,
//! positioned with `translate(..) scale(..)` transforms. The command
//! stream's relative deltas are serialized as absolute path data so
//! `close_path`/`reset` markers need no special casing downstream.

use slipmap::camera::ViewBox;
use slipmap::coord::{TileCoord, Transform, TILE_EXTENT};
use slipmap::geometry::{DecodedGeometry, PathCommand};
use slipmap::style::{PreparedLayer, PreparedShapeLayer};
use slipmap::surface::{HandleId, OutputSurface};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;

/// One attached drawable.
#[derive(Debug, Clone)]
struct SvgElement {
    layer: String,
    transform: Transform,
    drawable: Drawable,
}

#[derive(Debug, Clone)]
enum Drawable {
    Path {
        d: String,
        attrs: Vec<(&'static str, String)>,
    },
    Image {
        href: String,
    },
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    elements: HashMap<HandleId, SvgElement>,
    order: Vec<HandleId>,
    view_box: Option<ViewBox>,
    background: Option<String>,
}

/// Output surface that accumulates an SVG document.
#[derive(Debug)]
pub struct SvgSurface {
    /// Zoom used to resolve dynamic paint values.
    zoom: f64,
    /// Style layer ids in document order, one group each.
    layer_order: Vec<String>,
    state: Mutex<State>,
}

impl SvgSurface {
    pub fn new(layer_order: Vec<String>, zoom: f64) -> Self {
        Self {
            zoom,
            layer_order,
            state: Mutex::new(State::default()),
        }
    }

    /// Serialize the accumulated document.
    pub fn to_svg(&self) -> String {
        let state = self.state.lock().expect("svg lock poisoned");
        let view_box = state.view_box.unwrap_or(ViewBox {
            x: 0.0,
            y: 0.0,
            width: TILE_EXTENT as f64,
            height: TILE_EXTENT as f64,
        });

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}""#,
            view_box.x, view_box.y, view_box.width, view_box.height
        );
        if let Some(background) = &state.background {
            let _ = write!(svg, r#" style="background: {background}""#);
        }
        svg.push('>');
        svg.push('\n');

        for layer in &self.layer_order {
            let _ = writeln!(svg, r#"  <g id="layer-{layer}">"#);
            for handle in &state.order {
                let Some(element) = state.elements.get(handle) else {
                    continue;
                };
                if &element.layer != layer {
                    continue;
                }
                svg.push_str("    ");
                svg.push_str(&render_element(element));
                svg.push('\n');
            }
            svg.push_str("  </g>\n");
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn shape_attrs(&self, layer: &PreparedShapeLayer, fill: bool) -> Vec<(&'static str, String)> {
        let resolve_str = |key: &str| {
            layer
                .paint
                .get(key)
                .map(|value| value.resolve(self.zoom))
                .and_then(|value| value.as_str().map(String::from))
        };
        let resolve_num = |key: &str| {
            layer
                .paint
                .get(key)
                .map(|value| value.resolve(self.zoom))
                .and_then(|value| value.as_number())
        };

        let mut attrs = Vec::new();
        if fill {
            let color = resolve_str("fill-color").unwrap_or_else(|| "black".to_string());
            attrs.push(("fill", color));
            if let Some(opacity) = resolve_num("fill-opacity") {
                attrs.push(("opacity", opacity.to_string()));
            }
            attrs.push(("stroke", "none".to_string()));
        } else {
            let color = resolve_str("line-color").unwrap_or_else(|| "black".to_string());
            attrs.push(("stroke", color));
            let width = resolve_num("line-width").unwrap_or(1.0);
            attrs.push(("stroke-width", width.to_string()));
            if let Some(opacity) = resolve_num("line-opacity") {
                attrs.push(("opacity", opacity.to_string()));
            }
            attrs.push(("fill", "none".to_string()));
        }
        attrs
    }
}

impl OutputSurface for SvgSurface {
    fn set_view_box(&self, view_box: ViewBox) {
        self.state.lock().expect("svg lock poisoned").view_box = Some(view_box);
    }

    fn set_background(&self, color: Option<&str>) {
        self.state.lock().expect("svg lock poisoned").background = color.map(String::from);
    }

    fn attach(
        &self,
        _tile: TileCoord,
        layer: &str,
        drawable: &PreparedLayer,
        transform: Transform,
    ) -> HandleId {
        let drawable = match drawable {
            PreparedLayer::Fill(shape) => Drawable::Path {
                d: path_data(&shape.geometry),
                attrs: self.shape_attrs(shape, true),
            },
            PreparedLayer::Line(shape) => Drawable::Path {
                d: path_data(&shape.geometry),
                attrs: self.shape_attrs(shape, false),
            },
            PreparedLayer::Raster(raster) => Drawable::Image {
                href: raster.image.clone(),
            },
        };

        let mut state = self.state.lock().expect("svg lock poisoned");
        state.next_id += 1;
        let id = HandleId(state.next_id);
        state.elements.insert(
            id,
            SvgElement {
                layer: layer.to_string(),
                transform,
                drawable,
            },
        );
        state.order.push(id);
        id
    }

    fn set_transform(&self, handle: HandleId, transform: Transform) {
        let mut state = self.state.lock().expect("svg lock poisoned");
        if let Some(element) = state.elements.get_mut(&handle) {
            element.transform = transform;
        }
    }

    fn detach(&self, handle: HandleId) {
        let mut state = self.state.lock().expect("svg lock poisoned");
        state.elements.remove(&handle);
        state.order.retain(|id| *id != handle);
    }
}

fn render_element(element: &SvgElement) -> String {
    let t = element.transform;
    let transform = format!("translate({} {}) scale({})", t.dx, t.dy, t.scale);
    match &element.drawable {
        Drawable::Path { d, attrs } => {
            let mut markup = format!(r#"<path transform="{transform}" d="{d}""#);
            for (name, value) in attrs {
                let _ = write!(markup, r#" {name}="{value}""#);
            }
            markup.push_str("/>");
            markup
        }
        // One unit of bleed on each side hides seams between raster tiles.
        Drawable::Image { href } => format!(
            r#"<image transform="{transform}" x="-1" y="-1" width="{size}" height="{size}" href="{href}"/>"#,
            size = TILE_EXTENT + 2
        ),
    }
}

/// Serialize a merged command stream as absolute SVG path data.
fn path_data(geometry: &DecodedGeometry) -> String {
    let mut d = String::new();
    let (mut x, mut y) = (0i64, 0i64);
    for command in &geometry.commands {
        match command {
            PathCommand::MoveTo { x: dx, y: dy } => {
                x += *dx as i64;
                y += *dy as i64;
                let _ = write!(d, "M{x} {y}");
            }
            PathCommand::LineTo { points } => {
                for point in points {
                    x += point.x as i64;
                    y += point.y as i64;
                    let _ = write!(d, "L{x} {y}");
                }
            }
            PathCommand::ClosePath => d.push('Z'),
            PathCommand::Reset => {
                x = 0;
                y = 0;
            }
        }
    }
    d
}
