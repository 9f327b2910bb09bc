//! Core error types for holdstart-core.
//!
//! Exactly two failure kinds exist: rejected construction input and a
//! rejected time step. Both are synchronous, surfaced directly to the
//! caller, and nothing is retried internally.

use thiserror::Error;

/// Core error type for holdstart-core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StartError {
    /// Hold levels or delays rejected at construction. Construction either
    /// fully succeeds or has no observable effect.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `advance` was called with an elapsed duration that is not a strictly
    /// positive finite number. A rejected step mutates no timer.
    #[error("invalid time step: elapsed seconds must be a positive finite number (got {0})")]
    InvalidTimeStep(f64),
}

/// Result type alias for StartError.
pub type Result<T, E = StartError> = std::result::Result<T, E>;
