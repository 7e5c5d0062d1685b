//! Output surface interface.
//!
//! The engine does not draw; it hands prepared layers to an output surface
//! as opaque drawables with `translate + scale` transforms, and later
//! re-transforms or detaches them by handle. The host's drawing layer
//! (SVG, canvas, a scene graph) implements this trait; the engine only
//! requires that attach/detach/re-transform are cheap and callable from
//! the scheduling loops.

use crate::camera::ViewBox;
use crate::coord::{TileCoord, Transform};
use crate::style::PreparedLayer;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Opaque identifier for an attached drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host drawing layer the scheduler renders into.
pub trait OutputSurface: Send + Sync {
    /// Update the logical view box; called on start and on every resize.
    fn set_view_box(&self, view_box: ViewBox);

    /// Set the background color (`None` clears it).
    fn set_background(&self, color: Option<&str>);

    /// Attach one prepared layer of a tile with its initial transform,
    /// returning the handle used for later updates.
    fn attach(
        &self,
        tile: TileCoord,
        layer: &str,
        drawable: &PreparedLayer,
        transform: Transform,
    ) -> HandleId;

    /// Re-position an attached drawable.
    fn set_transform(&self, handle: HandleId, transform: Transform);

    /// Remove an attached drawable.
    fn detach(&self, handle: HandleId);
}

/// What a [`RecordingSurface`] knows about one attached drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedDrawable {
    pub tile: TileCoord,
    pub layer: String,
    pub transform: Transform,
}

#[derive(Debug, Default)]
struct RecordingState {
    next_id: u64,
    attached: HashMap<HandleId, AttachedDrawable>,
    view_box: Option<ViewBox>,
    background: Option<String>,
    attach_count: u64,
    detach_count: u64,
    transform_count: u64,
}

/// Surface double that records every operation, for tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<RecordingState>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drawables currently attached for a tile, in attach order.
    pub fn attached_layers(&self, tile: TileCoord) -> Vec<AttachedDrawable> {
        let state = self.state.lock().expect("surface lock poisoned");
        let mut drawables: Vec<_> = state
            .attached
            .iter()
            .filter(|(_, d)| d.tile == tile)
            .map(|(id, d)| (*id, d.clone()))
            .collect();
        drawables.sort_by_key(|(id, _)| id.0);
        drawables.into_iter().map(|(_, d)| d).collect()
    }

    /// Whether any drawable of the tile is attached.
    pub fn is_attached(&self, tile: TileCoord) -> bool {
        let state = self.state.lock().expect("surface lock poisoned");
        state.attached.values().any(|d| d.tile == tile)
    }

    /// Distinct tiles with attached drawables.
    pub fn attached_tiles(&self) -> Vec<TileCoord> {
        let state = self.state.lock().expect("surface lock poisoned");
        let mut tiles: Vec<_> = state.attached.values().map(|d| d.tile).collect();
        tiles.sort_by_key(|t| (t.z, t.x, t.y));
        tiles.dedup();
        tiles
    }

    /// Total attach calls observed.
    pub fn attach_count(&self) -> u64 {
        self.state.lock().expect("surface lock poisoned").attach_count
    }

    /// Total detach calls observed.
    pub fn detach_count(&self) -> u64 {
        self.state.lock().expect("surface lock poisoned").detach_count
    }

    /// Total re-transform calls observed.
    pub fn transform_count(&self) -> u64 {
        self.state
            .lock()
            .expect("surface lock poisoned")
            .transform_count
    }

    /// Last view box pushed to the surface.
    pub fn view_box(&self) -> Option<ViewBox> {
        self.state.lock().expect("surface lock poisoned").view_box
    }

    /// Current background color.
    pub fn background(&self) -> Option<String> {
        self.state
            .lock()
            .expect("surface lock poisoned")
            .background
            .clone()
    }
}

impl OutputSurface for RecordingSurface {
    fn set_view_box(&self, view_box: ViewBox) {
        self.state.lock().expect("surface lock poisoned").view_box = Some(view_box);
    }

    fn set_background(&self, color: Option<&str>) {
        self.state.lock().expect("surface lock poisoned").background = color.map(String::from);
    }

    fn attach(
        &self,
        tile: TileCoord,
        layer: &str,
        _drawable: &PreparedLayer,
        transform: Transform,
    ) -> HandleId {
        let mut state = self.state.lock().expect("surface lock poisoned");
        state.next_id += 1;
        let id = HandleId(state.next_id);
        state.attached.insert(
            id,
            AttachedDrawable {
                tile,
                layer: layer.to_string(),
                transform,
            },
        );
        state.attach_count += 1;
        id
    }

    fn set_transform(&self, handle: HandleId, transform: Transform) {
        let mut state = self.state.lock().expect("surface lock poisoned");
        state.transform_count += 1;
        if let Some(drawable) = state.attached.get_mut(&handle) {
            drawable.transform = transform;
        }
    }

    fn detach(&self, handle: HandleId) {
        let mut state = self.state.lock().expect("surface lock poisoned");
        if state.attached.remove(&handle).is_some() {
            state.detach_count += 1;
        }
    }
}
