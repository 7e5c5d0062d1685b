//! Service error types.

use thiserror::Error;

/// Errors from the service lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// `start` was called while the scheduler is already running.
    #[error("map service is already running")]
    AlreadyRunning,

    /// `stop` was called without a running scheduler.
    #[error("map service is not running")]
    NotRunning,
}
