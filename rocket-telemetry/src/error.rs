//! Error types for the parts of the system that can actually fail in a
//! way the caller must react to.
//!
//! Most of this system recovers locally (§7 of the design doc): a
//! device that won't open falls back to its dummy loop, a mid-run read
//! failure just ends that one worker, a transport failure is logged and
//! the aggregator carries on. `SetupError` is reserved for the handful
//! of failures that are fatal to the whole process at startup.

use thiserror::Error;

/// Failures during process setup, before any worker has started.
/// Every variant is unrecoverable — the supervisor logs it and exits
/// with a non-zero status.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("could not install the {signal} signal handler: {source}")]
    SignalHandler {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("could not spawn the {worker} thread: {source}")]
    ThreadSpawn {
        worker: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Why a worker's device failed to open. Always recoverable — the
/// worker logs a `WARN` and runs its dummy loop instead.
#[derive(Debug, Error)]
pub enum DeviceOpenError {
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}
