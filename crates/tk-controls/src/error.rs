//! Error types for control operations.

use thiserror::Error;
use tk_core::Mode;

use crate::actuator::ActuatorError;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Mode change not allowed from an external request.
    #[error("Mode {requested} cannot be requested externally")]
    ModeRejected { requested: Mode },

    /// Command could not be delivered to the actuator.
    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),
}
