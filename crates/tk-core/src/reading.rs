use serde::{Deserialize, Serialize};

use crate::{Millis, Real};

/// A single water level sample, immutable once recorded.
///
/// Negative levels are kept as-is; they only show up as sensor faults and
/// are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelReading {
    /// Level in centimeters.
    pub level: Real,
    /// Arrival time in monotonic milliseconds.
    pub timestamp: Millis,
}

impl LevelReading {
    pub fn new(level: Real, timestamp: Millis) -> Self {
        Self { level, timestamp }
    }
}
