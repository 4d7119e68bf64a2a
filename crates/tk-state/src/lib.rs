//! Shared control state for tankctl.
//!
//! [`SharedState`] is the single source of truth read and written by every
//! thread of the control unit: telemetry ingress, actuator transport, the
//! operator endpoint and the control loop. It holds no business logic; it
//! only guarantees that compound updates are applied as one unit.
//!
//! # Concurrency
//!
//! The aggregate lives behind one reader/writer lock. Readers never block each
//! other, writers are serialized, and no guard ever escapes this crate, so the
//! lock can't be held across calls into other components.

pub mod history;
pub mod shared;

pub use history::{DEFAULT_HISTORY_CAPACITY, LevelHistory};
pub use shared::{SharedState, StateSnapshot};
