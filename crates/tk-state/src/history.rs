//! Bounded, arrival-ordered level history.

use std::collections::VecDeque;

use tk_core::{CoreError, CoreResult, LevelReading};

/// Number of readings kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// FIFO ring of the most recent readings.
///
/// Once `capacity` is exceeded the oldest reading is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelHistory {
    readings: VecDeque<LevelReading>,
    capacity: usize,
}

impl LevelHistory {
    /// Create an empty history.
    ///
    /// # Errors
    ///
    /// Returns error if `capacity` is zero.
    pub fn new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::InvalidArg {
                what: "history capacity must be at least 1",
            });
        }
        Ok(Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a reading, evicting the oldest one if the history is full.
    pub fn push(&mut self, reading: LevelReading) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<&LevelReading> {
        self.readings.back()
    }

    /// Oldest-first iterator.
    pub fn iter(&self) -> impl Iterator<Item = &LevelReading> {
        self.readings.iter()
    }

    /// Owned copy in arrival order.
    pub fn to_vec(&self) -> Vec<LevelReading> {
        self.readings.iter().copied().collect()
    }
}

impl Default for LevelHistory {
    fn default() -> Self {
        Self {
            readings: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
