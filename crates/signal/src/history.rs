//! Bounded chronological reading history (FIFO ring).

use std::collections::VecDeque;

use bridgewatch_core::config::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};

use crate::reading::Reading;

fn default_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Oldest-first log of processed readings; the oldest entry is evicted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRing {
    #[serde(default = "default_capacity")]
    capacity: usize,
    readings: VecDeque<Reading>,
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryRing {
    /// Create an empty ring holding at most `capacity` readings.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a reading, evicting from the head once over capacity.
    pub fn append(&mut self, reading: Reading) {
        self.readings.push_back(reading);
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    /// Vibration values of the `n` most recent readings, oldest first.
    pub fn recent_vibrations(&self, n: usize) -> impl Iterator<Item = f64> + '_ {
        let skip = self.readings.len().saturating_sub(n);
        self.readings.iter().skip(skip).map(|r| r.vibration)
    }

    /// Change the capacity, evicting the oldest readings if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    /// Drop every reading.
    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Most recent reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// Readings, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Number of stored readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Maximum number of stored readings.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
