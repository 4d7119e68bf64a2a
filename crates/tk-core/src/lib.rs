//! tk-core: stable foundation for tankctl.
//!
//! Contains:
//! - mode (operating mode of the control unit)
//! - reading (immutable level readings)
//! - clock (monotonic millisecond time source + a manual clock for tests)
//! - numeric (Real + finite checks + percentage clamping)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod mode;
pub mod numeric;
pub mod reading;

// Re-exports: nice ergonomics for downstream crates
pub use clock::{Clock, ManualClock, Millis, MonotonicClock, NEVER};
pub use error::{CoreError, CoreResult};
pub use mode::Mode;
pub use numeric::*;
pub use reading::LevelReading;
