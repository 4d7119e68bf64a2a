//! Egress seam towards the valve controller.
//!
//! The control unit never talks to a transport directly. It hands
//! [`ActuatorCommand`]s to an [`ActuatorSink`], which owns serialization
//! and delivery. Commands encode as one JSON object per frame:
//!
//! ```text
//! {"cmd":"set_valve","value":50}
//! {"cmd":"set_mode","value":"MANUAL"}
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tk_core::Mode;

/// Errors reported by an actuator transport.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActuatorError {
    /// The link is not open (yet, or any more).
    #[error("Actuator unavailable: {what}")]
    Unavailable { what: String },

    /// The link is open but the write failed.
    #[error("Actuator transport error: {message}")]
    Transport { message: String },
}

/// A command for the valve controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "value", rename_all = "snake_case")]
pub enum ActuatorCommand {
    /// Move the valve to an opening percentage in `[0, 100]`.
    SetValve(u8),
    /// Tell the valve controller which mode the unit is in.
    SetMode(Mode),
}

impl ActuatorCommand {
    /// Encode as a single-line JSON frame.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Command sink implemented by the actuator transport.
///
/// Called from several threads (control loop, operator endpoint); the sink
/// is responsible for serializing concurrent sends.
pub trait ActuatorSink: Send + Sync {
    fn send(&self, command: &ActuatorCommand) -> Result<(), ActuatorError>;

    fn send_valve_command(&self, opening: u8) -> Result<(), ActuatorError> {
        self.send(&ActuatorCommand::SetValve(opening))
    }

    fn send_mode_command(&self, mode: Mode) -> Result<(), ActuatorError> {
        self.send(&ActuatorCommand::SetMode(mode))
    }
}

/// In-memory sink that records delivered commands.
///
/// Can be switched into a failing state to simulate an unavailable link;
/// failed sends are not recorded.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    sent: Mutex<Vec<ActuatorCommand>>,
    failing: AtomicBool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All delivered commands, oldest first.
    pub fn commands(&self) -> Vec<ActuatorCommand> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Delivered valve openings, oldest first.
    pub fn valve_commands(&self) -> Vec<u8> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                ActuatorCommand::SetValve(v) => Some(v),
                ActuatorCommand::SetMode(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ActuatorSink for RecordingActuator {
    fn send(&self, command: &ActuatorCommand) -> Result<(), ActuatorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ActuatorError::Unavailable {
                what: "recording actuator switched off".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*command);
        Ok(())
    }
}
