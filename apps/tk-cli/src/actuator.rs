//! Line-oriented actuator transport: one JSON command frame per line.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use tk_controls::{ActuatorCommand, ActuatorError, ActuatorSink};

/// Writes `> {frame}` lines to any writer (stdout in `run`).
pub struct LineActuator<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> LineActuator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> ActuatorSink for LineActuator<W> {
    fn send(&self, command: &ActuatorCommand) -> Result<(), ActuatorError> {
        let frame = command.to_frame().map_err(|e| ActuatorError::Transport {
            message: e.to_string(),
        })?;
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "> {frame}")
            .and_then(|()| out.flush())
            .map_err(|e| ActuatorError::Transport {
                message: e.to_string(),
            })
    }
}
