//! Configuration management for bridgewatch.
//!
//! Every threshold the signal pipeline uses lives in [`MonitorConfig`]. All
//! fields default to the production thresholds, so an empty TOML table is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Readings needed before a baseline is computed
pub const DEFAULT_CALIBRATION_SAMPLES: u32 = 50;
/// Deviation ratio (+50% over baseline) that raises a warning
pub const DEFAULT_WARNING_RATIO: f64 = 0.5;
/// Deviation ratio (+100% over baseline) that raises a critical alert
pub const DEFAULT_CRITICAL_RATIO: f64 = 1.0;
/// Readings retained per asset
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;
/// Alerts retained per asset
pub const DEFAULT_ALERT_CAPACITY: usize = 20;
/// Silence after which an online asset is demoted to offline
pub const DEFAULT_OFFLINE_TIMEOUT_MS: u64 = 10_000;
/// Period of the liveness sweep
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5_000;

/// Thresholds and capacities for the per-asset signal pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Calibration sample target (N)
    pub calibration_samples: u32,
    /// Increase ratio at or above which a warning is raised
    pub warning_ratio: f64,
    /// Increase ratio at or above which a critical alert is raised
    pub critical_ratio: f64,
    /// Reading history ring capacity
    pub history_capacity: usize,
    /// Alert ledger capacity
    pub alert_capacity: usize,
    /// Offline timeout in milliseconds
    pub offline_timeout_ms: u64,
    /// Liveness sweep period in milliseconds
    pub sweep_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            calibration_samples: DEFAULT_CALIBRATION_SAMPLES,
            warning_ratio: DEFAULT_WARNING_RATIO,
            critical_ratio: DEFAULT_CRITICAL_RATIO,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            alert_capacity: DEFAULT_ALERT_CAPACITY,
            offline_timeout_ms: DEFAULT_OFFLINE_TIMEOUT_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

impl MonitorConfig {
    /// Load a monitor configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a monitor configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.calibration_samples == 0 {
            return Err(CoreError::Config(
                "calibration_samples must be at least 1".to_string(),
            ));
        }
        if self.calibration_samples as usize > self.history_capacity + 1 {
            // the baseline window is read back out of the history ring
            return Err(CoreError::Config(format!(
                "history_capacity {} cannot hold a calibration window of {} samples",
                self.history_capacity, self.calibration_samples
            )));
        }
        if self.alert_capacity == 0 {
            return Err(CoreError::Config("alert_capacity must be at least 1".to_string()));
        }
        if !(self.warning_ratio.is_finite() && self.warning_ratio > 0.0) {
            return Err(CoreError::Config(format!(
                "warning_ratio must be positive, got {}",
                self.warning_ratio
            )));
        }
        if !(self.critical_ratio.is_finite() && self.critical_ratio >= self.warning_ratio) {
            return Err(CoreError::Config(format!(
                "critical_ratio {} must not be below warning_ratio {}",
                self.critical_ratio, self.warning_ratio
            )));
        }
        if self.offline_timeout_ms == 0 || self.sweep_interval_ms == 0 {
            return Err(CoreError::Config(
                "offline_timeout_ms and sweep_interval_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Offline timeout as a `Duration`.
    pub fn offline_timeout(&self) -> Duration {
        Duration::from_millis(self.offline_timeout_ms)
    }

    /// Liveness sweep period as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}
