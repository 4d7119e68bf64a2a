//! Error types for the tk-app service layer.

use std::path::PathBuf;

use tk_controls::{ActuatorError, ControlError};
use tk_core::{CoreError, Mode};

/// Application error type that wraps errors from the backend crates
/// and gives collaborators one error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid configuration: {field} ({reason})")]
    Config { field: &'static str, reason: String },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Malformed telemetry {payload:?}: {reason}")]
    Telemetry { payload: String, reason: String },

    #[error("Valve opening must be 0-100, got {value}")]
    OutOfRange { value: i64 },

    #[error("Valve can only be set in MANUAL mode (current mode: {mode})")]
    NotManual { mode: Mode },

    #[error("Mode {requested} cannot be requested")]
    ModeRejected { requested: Mode },

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("Control error: {0}")]
    Control(ControlError),

    #[error("Control thread panicked")]
    ControlThreadPanicked,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tk-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ControlError> for AppError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::ModeRejected { requested } => AppError::ModeRejected { requested },
            ControlError::Actuator(e) => AppError::Actuator(e),
            other => AppError::Control(other),
        }
    }
}
