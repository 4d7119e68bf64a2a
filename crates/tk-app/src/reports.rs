//! Status frames forwarded by the actuator transport.
//!
//! The valve controller reports its own view as `{"mode": "...", "valve": N}`,
//! either key optional. A reported valve position is written back into the
//! shared state (clamped); a reported mode is only logged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tk_state::SharedState;
use tracing::{debug, info};

use crate::error::AppResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valve: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ReportHandler {
    state: Arc<SharedState>,
}

impl ReportHandler {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Decode one JSON frame and apply it. Undecodable frames change nothing.
    pub fn handle_frame(&self, frame: &str) -> AppResult<ActuatorReport> {
        let report: ActuatorReport = serde_json::from_str(frame.trim())?;
        self.apply(&report);
        Ok(report)
    }

    /// Apply a decoded report; returns the stored opening if one was reported.
    pub fn apply(&self, report: &ActuatorReport) -> Option<u8> {
        if let Some(mode) = &report.mode {
            debug!(mode = %mode, "actuator reported mode");
        }
        report.valve.map(|valve| {
            let stored = self.state.set_valve_opening(valve);
            info!(reported = valve, stored, "actuator confirmed valve position");
            stored
        })
    }
}
