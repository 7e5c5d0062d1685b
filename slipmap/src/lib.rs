//! Slipmap - client-side tiled map rendering engine
//!
//! This library maintains a continuous map viewport ("camera"), decodes tile
//! geometry from a compact binary command-stream encoding, resolves a
//! declarative style document against decoded features, and schedules
//! prepared tiles onto an output surface as the camera moves.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a facade that wires
//! the pieces together:
//!
//! ```ignore
//! use slipmap::service::{MapService, ServiceConfig};
//! use slipmap::camera::CameraMove;
//!
//! let service = MapService::new(config, style_doc, source, surface)?;
//! service.start();
//!
//! // Input callbacks feed the camera; the scheduler does the rest.
//! service.move_camera(CameraMove { zoom: Some(11.5), ..Default::default() });
//! ```
//!
//! The individual subsystems are usable on their own: [`coord`] for the
//! Web-Mercator math, [`geometry`] for the command-stream decoder, [`style`]
//! for turning raw tiles into prepared tiles, and [`scheduler`] for the
//! wanted-set bookkeeping and the two update cadences.

pub mod cache;
pub mod camera;
pub mod coord;
pub mod geometry;
pub mod logging;
pub mod scheduler;
pub mod service;
pub mod source;
pub mod style;
pub mod surface;
pub mod tile;

/// Version of the slipmap library and CLI.
///
/// Synchronized across all workspace members; injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
