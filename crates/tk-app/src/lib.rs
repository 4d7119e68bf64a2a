//! Application service layer for tankctl.
//!
//! Wires the shared state, the policy engine and the mode rules into a
//! running control unit, and exposes the handles the three external
//! collaborators use:
//!
//! - telemetry ingress feeds raw payloads to [`TelemetryIngress`]
//! - the actuator transport implements [`tk_controls::ActuatorSink`] and
//!   forwards status frames to [`ReportHandler`]
//! - the operator endpoint calls [`OperatorService`]

pub mod config;
pub mod control_loop;
pub mod error;
pub mod ingress;
pub mod operator;
pub mod reports;
pub mod runtime;

// Re-export key types for convenience
pub use config::{ControlConfig, from_yaml_str, load_yaml};
pub use control_loop::{ControlLoop, TickOutcome};
pub use error::{AppError, AppResult};
pub use ingress::TelemetryIngress;
pub use operator::{HistoryEntry, HistoryReport, OperatorService, StatusReport};
pub use reports::{ActuatorReport, ReportHandler};
pub use runtime::ControlUnit;
