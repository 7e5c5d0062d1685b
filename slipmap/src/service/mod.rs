//! Map service facade.
//!
//! Wires camera, tile source, style engine, cache and scheduler into one
//! object with the small surface an embedding application needs: start and
//! stop the scheduling loops, and forward input-controller events to the
//! camera.

mod config;
mod error;
mod facade;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use facade::MapService;
