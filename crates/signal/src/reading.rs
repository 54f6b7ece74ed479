//! Processed readings
//!
//! A [`Reading`] is produced once per accepted measurement and never mutated
//! afterwards; it is only appended to and evicted from the history ring.

use bridgewatch_core::{format_time_of_day, TimestampMs};
use serde::{Deserialize, Serialize};

use crate::deviation::{DeviationResult, Severity};
use crate::normalizer::Axes;

/// Phase-dependent metadata attached to a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum ReadingAnalysis {
    /// Observed while the asset was learning its baseline
    #[serde(rename_all = "camelCase")]
    Calibrating {
        /// Always true; kept on the wire for dashboard compatibility
        is_calibrating: bool,
        /// `min(100, samples / N * 100)`
        progress_percent: f64,
        /// Set on the reading that completed calibration
        calibration_complete: bool,
    },
    /// Observed against a calibrated baseline
    #[serde(rename_all = "camelCase")]
    Analyzed {
        /// Ratio and severity of this reading
        deviation: DeviationResult,
        /// True when this reading raised an alert
        alert: bool,
        /// Alert message, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// One processed accelerometer reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Raw X axis
    pub x: f64,
    /// Raw Y axis
    pub y: f64,
    /// Raw Z axis
    pub z: f64,
    /// `|‖(x,y,z)‖ - g|`
    pub vibration: f64,
    /// Arrival time (Unix milliseconds)
    pub timestamp: TimestampMs,
    /// `HH:MM:SS` rendering of `timestamp`
    pub time_formatted: String,
    /// Calibration or deviation metadata
    pub analysis: ReadingAnalysis,
}

impl Reading {
    pub(crate) fn calibrating(
        axes: Axes,
        vibration: f64,
        timestamp: TimestampMs,
        progress_percent: f64,
        calibration_complete: bool,
    ) -> Self {
        Self::new(
            axes,
            vibration,
            timestamp,
            ReadingAnalysis::Calibrating {
                is_calibrating: true,
                progress_percent,
                calibration_complete,
            },
        )
    }

    pub(crate) fn analyzed(
        axes: Axes,
        vibration: f64,
        timestamp: TimestampMs,
        deviation: DeviationResult,
    ) -> Self {
        Self::new(
            axes,
            vibration,
            timestamp,
            ReadingAnalysis::Analyzed {
                deviation,
                alert: deviation.severity.is_alerting(),
                message: deviation.severity.message().map(str::to_string),
            },
        )
    }

    fn new(axes: Axes, vibration: f64, timestamp: TimestampMs, analysis: ReadingAnalysis) -> Self {
        Self {
            x: axes.x,
            y: axes.y,
            z: axes.z,
            vibration,
            timestamp,
            time_formatted: format_time_of_day(timestamp),
            analysis,
        }
    }

    /// Deviation metrics, present once the asset is calibrated.
    pub fn deviation(&self) -> Option<&DeviationResult> {
        match &self.analysis {
            ReadingAnalysis::Analyzed { deviation, .. } => Some(deviation),
            ReadingAnalysis::Calibrating { .. } => None,
        }
    }

    /// Severity of this reading; calibration readings are always normal.
    pub fn severity(&self) -> Severity {
        self.deviation()
            .map(|d| d.severity)
            .unwrap_or(Severity::Normal)
    }

    /// True for the reading that completed calibration.
    pub fn completed_calibration(&self) -> bool {
        matches!(
            self.analysis,
            ReadingAnalysis::Calibrating {
                calibration_complete: true,
                ..
            }
        )
    }
}

/// Reading as published on the per-asset data channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedReading {
    /// The stored reading
    #[serde(flatten)]
    pub reading: Reading,
    /// Baseline after this reading was processed
    pub natural_frequency: Option<f64>,
    /// Calibration state after this reading was processed
    pub is_calibrated: bool,
}
