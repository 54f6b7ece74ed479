//! Deviation analyzer
//!
//! Measures how far a post-calibration reading sits above the learned
//! baseline and grades the excess into a severity.

use bridgewatch_core::{CoreError, MonitorConfig, Result};
use serde::{Deserialize, Serialize};

/// Severity of a reading relative to its baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Within tolerance, no alert
    Normal,
    /// At or above the warning ratio
    Warning,
    /// At or above the critical ratio
    Critical,
}

impl Severity {
    /// True when an alert must be raised.
    pub fn is_alerting(&self) -> bool {
        !matches!(self, Severity::Normal)
    }

    /// Human-readable message attached to readings and alerts.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Severity::Normal => None,
            Severity::Warning => Some("Warning: high vibration"),
            Severity::Critical => Some("Critical vibration level"),
        }
    }
}

/// Result of comparing one vibration value against a baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviationResult {
    /// `(vibration - baseline) / baseline`, negative when quieter than baseline
    pub increase_ratio: f64,
    /// `vibration / baseline`
    pub ratio: f64,
    /// `max(0, increase_ratio * 100)`
    pub risk_percent: f64,
    /// Graded severity
    pub severity: Severity,
}

/// Threshold-based severity classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationAnalyzer {
    warning_ratio: f64,
    critical_ratio: f64,
}

impl Default for DeviationAnalyzer {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

impl DeviationAnalyzer {
    /// Create an analyzer with explicit thresholds.
    pub fn new(warning_ratio: f64, critical_ratio: f64) -> Self {
        Self {
            warning_ratio,
            critical_ratio,
        }
    }

    /// Create an analyzer from the monitor configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.warning_ratio, config.critical_ratio)
    }

    /// Compare `vibration` against `baseline`.
    ///
    /// Fails with [`CoreError::DivisionByZeroBaseline`] unless the baseline
    /// is a positive finite number, and with [`CoreError::InvalidReading`]
    /// when the vibration or any derived ratio is not finite. No NaN or
    /// infinite ratio ever leaves here.
    pub fn analyze(&self, baseline: f64, vibration: f64) -> Result<DeviationResult> {
        if !(baseline.is_finite() && baseline > 0.0) {
            return Err(CoreError::DivisionByZeroBaseline);
        }

        let increase_ratio = (vibration - baseline) / baseline;
        let ratio = vibration / baseline;
        let risk_percent = (increase_ratio * 100.0).max(0.0);
        if !(increase_ratio.is_finite() && ratio.is_finite() && risk_percent.is_finite()) {
            return Err(CoreError::InvalidReading(format!(
                "vibration {vibration} is out of range for baseline {baseline}"
            )));
        }

        let severity = if increase_ratio >= self.critical_ratio {
            Severity::Critical
        } else if increase_ratio >= self.warning_ratio {
            Severity::Warning
        } else {
            Severity::Normal
        };

        Ok(DeviationResult {
            increase_ratio,
            ratio,
            risk_percent,
            severity,
        })
    }
}
