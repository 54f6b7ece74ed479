//! Alert ledger
//!
//! Bounded newest-first log of alerts raised for one asset. New alerts are
//! prepended; once over capacity the tail (chronologically oldest) is dropped.

use std::collections::VecDeque;

use bridgewatch_core::config::DEFAULT_ALERT_CAPACITY;
use bridgewatch_core::TimestampMs;
use serde::{Deserialize, Serialize};

use crate::deviation::{DeviationResult, Severity};
use crate::reading::Reading;

fn default_capacity() -> usize {
    DEFAULT_ALERT_CAPACITY
}

/// An alert raised by a reading above the warning threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Time-based id, strictly increasing within one ledger
    pub id: u64,
    /// Warning or critical
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Vibration value that triggered the alert
    pub vibration: f64,
    /// Relative increase over baseline
    pub increase_ratio: f64,
    /// `vibration / baseline`
    pub ratio: f64,
    /// Clamped percentage over baseline
    pub risk_percent: f64,
    /// Reading time (Unix milliseconds)
    pub timestamp: TimestampMs,
    /// `HH:MM:SS` rendering of `timestamp`
    pub time_formatted: String,
}

/// Newest-first bounded alert log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertLedger {
    #[serde(default = "default_capacity")]
    capacity: usize,
    alerts: VecDeque<Alert>,
    #[serde(default)]
    last_id: u64,
}

impl Default for AlertLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ALERT_CAPACITY)
    }
}

impl AlertLedger {
    /// Create an empty ledger holding at most `capacity` alerts.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            alerts: VecDeque::with_capacity(capacity),
            last_id: 0,
        }
    }

    /// Record an alert for `reading` unless the deviation is normal.
    ///
    /// Returns the created alert so the caller can publish it.
    pub fn record_if_alerting(
        &mut self,
        deviation: &DeviationResult,
        reading: &Reading,
    ) -> Option<Alert> {
        let message = deviation.severity.message()?;

        // Readings can share a millisecond; ids must still order for display
        let id = reading.timestamp.max(self.last_id + 1);
        self.last_id = id;

        let alert = Alert {
            id,
            severity: deviation.severity,
            message: message.to_string(),
            vibration: reading.vibration,
            increase_ratio: deviation.increase_ratio,
            ratio: deviation.ratio,
            risk_percent: deviation.risk_percent,
            timestamp: reading.timestamp,
            time_formatted: reading.time_formatted.clone(),
        };

        self.alerts.push_front(alert.clone());
        self.alerts.truncate(self.capacity);
        Some(alert)
    }

    /// Change the capacity, dropping the oldest alerts if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.alerts.truncate(capacity);
    }

    /// Drop every alert. Id ordering is preserved across clears.
    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    /// Alerts, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    /// Most recent alert.
    pub fn latest(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    /// Number of stored alerts.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// True when no alert is stored.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
