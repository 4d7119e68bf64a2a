//! Level control policy and mode rules for tankctl.
//!
//! This crate holds the decision side of the control unit. It reads and
//! writes [`tk_state::SharedState`] but never owns threads; the periodic
//! driver lives in `tk-app`.
//!
//! # Architecture
//!
//! - [`PolicyEngine`] turns a level reading into a target valve opening,
//!   with a time-debounced hysteresis band between L1 and L2
//! - [`ConnectivityWatchdog`] decides whether the sensor feed is alive
//! - [`ModeController`] enforces which mode changes are allowed and by whom
//! - [`ActuatorSink`] is the egress seam towards the valve controller
//! - [`TickConfig`] / [`TickStats`] describe and measure the control period

pub mod actuator;
pub mod error;
pub mod mode;
pub mod policy;
pub mod tick;
pub mod watchdog;

pub use actuator::{ActuatorCommand, ActuatorError, ActuatorSink, RecordingActuator};
pub use error::{ControlError, ControlResult};
pub use mode::ModeController;
pub use policy::{HysteresisPolicy, HysteresisState, PolicyEngine};
pub use tick::{DEFAULT_TICK_MS, TickConfig, TickStats};
pub use watchdog::{ConnectivityWatchdog, is_connected};
