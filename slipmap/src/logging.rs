//! Logging initialization.
//!
//! The engine logs through `tracing` everywhere; embedding applications
//! that already install a subscriber can skip this module entirely. For
//! standalone tools, [`init`] sets up console output filtered by the
//! `RUST_LOG` environment variable (default `info`).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}
