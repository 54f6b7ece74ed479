//! Per-asset monitoring state and the ingestion pipeline
//!
//! [`AssetState`] owns everything the monitor knows about one asset:
//! connectivity, calibration phase, reading history and alert log. A reading
//! flows through [`AssetState::observe`]:
//!
//! 1. vibration is derived from the axes
//! 2. `last_seen_at` and connectivity are updated
//! 3. uncalibrated: calibration step, history append, then the optional
//!    calibration-complete event and the data event
//! 4. calibrated: deviation, alert ledger, history append, then the data
//!    event and the optional alert event
//! 5. an `Online` connectivity event closes the batch
//!
//! Every fallible step runs before the first mutation, so a rejected reading
//! leaves the state untouched.

use bridgewatch_core::{AssetId, MonitorConfig, Result, TimestampMs};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alerts::{Alert, AlertLedger};
use crate::calibration::{CalibrationPhase, CalibrationStep};
use crate::deviation::DeviationAnalyzer;
use crate::events::{Connectivity, MonitorEvent};
use crate::history::HistoryRing;
use crate::normalizer::Axes;
use crate::reading::{EnrichedReading, Reading};

/// Monitoring state of a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetState {
    /// Asset identifier
    pub id: AssetId,
    /// Online once a reading arrives; Offline after the timeout
    #[serde(default)]
    pub connectivity: Connectivity,
    /// Time of the last accepted reading
    #[serde(default)]
    pub last_seen_at: Option<TimestampMs>,
    /// Calibration phase and baseline
    #[serde(default)]
    pub calibration: CalibrationPhase,
    /// Chronological reading log
    #[serde(default)]
    pub history: HistoryRing,
    /// Newest-first alert log
    #[serde(default)]
    pub alerts: AlertLedger,
}

/// Everything one accepted reading produced
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingOutcome {
    /// The stored reading
    pub reading: Reading,
    /// Alert raised by this reading, if any
    pub alert: Option<Alert>,
    /// Baseline learned by this reading, if it completed calibration
    pub calibrated_baseline: Option<f64>,
    /// Events to publish, in order
    pub events: Vec<MonitorEvent>,
}

impl AssetState {
    /// Fresh asset: offline, never seen, uncalibrated.
    pub fn new(id: impl Into<AssetId>, config: &MonitorConfig) -> Self {
        Self {
            id: id.into(),
            connectivity: Connectivity::Offline,
            last_seen_at: None,
            calibration: CalibrationPhase::default(),
            history: HistoryRing::with_capacity(config.history_capacity),
            alerts: AlertLedger::with_capacity(config.alert_capacity),
        }
    }

    /// True once a baseline has been learned.
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    /// Learned baseline ("natural frequency").
    pub fn baseline(&self) -> Option<f64> {
        self.calibration.baseline()
    }

    /// Apply configured capacities to state loaded from a snapshot.
    pub fn apply_capacities(&mut self, config: &MonitorConfig) {
        self.history.set_capacity(config.history_capacity);
        self.alerts.set_capacity(config.alert_capacity);
    }

    /// Run one reading through the pipeline.
    pub fn observe(
        &mut self,
        axes: Axes,
        now: TimestampMs,
        config: &MonitorConfig,
    ) -> Result<ReadingOutcome> {
        let vibration = axes.checked_vibration()?;

        let deviation = self
            .calibration
            .baseline()
            .map(|baseline| DeviationAnalyzer::from_config(config).analyze(baseline, vibration))
            .transpose()?;

        self.last_seen_at = Some(now);
        self.connectivity = Connectivity::Online;

        let mut events = Vec::with_capacity(4);
        let (reading, alert, calibrated_baseline) = match deviation {
            None => {
                let step: CalibrationStep = self.calibration.observe(
                    vibration,
                    &self.history,
                    config.calibration_samples,
                );
                let reading = Reading::calibrating(
                    axes,
                    vibration,
                    now,
                    step.progress_percent,
                    step.is_complete(),
                );
                self.history.append(reading.clone());

                if let Some(baseline) = step.baseline() {
                    info!(asset_id = %self.id, baseline, "Asset calibrated");
                    events.push(MonitorEvent::CalibrationCompleted {
                        asset_id: self.id.clone(),
                        baseline,
                    });
                }
                events.push(self.data_event(&reading));
                (reading, None, step.baseline())
            }
            Some(deviation) => {
                let reading = Reading::analyzed(axes, vibration, now, deviation);
                let alert = self.alerts.record_if_alerting(&deviation, &reading);
                self.history.append(reading.clone());

                events.push(self.data_event(&reading));
                if let Some(alert) = &alert {
                    events.push(MonitorEvent::Alert {
                        asset_id: self.id.clone(),
                        alert: alert.clone(),
                    });
                }
                (reading, alert, None)
            }
        };

        debug!(
            asset_id = %self.id,
            vibration,
            severity = ?reading.severity(),
            "Reading processed"
        );

        events.push(MonitorEvent::Connectivity {
            asset_id: self.id.clone(),
            state: Connectivity::Online,
            last_seen_at: self.last_seen_at,
        });

        Ok(ReadingOutcome {
            reading,
            alert,
            calibrated_baseline,
            events,
        })
    }

    /// Restart calibration, dropping history and alerts.
    ///
    /// Connectivity and `last_seen_at` are left alone.
    pub fn recalibrate(&mut self) -> MonitorEvent {
        self.calibration.reset();
        self.history.clear();
        self.alerts.clear();
        info!(asset_id = %self.id, "Calibration started");

        MonitorEvent::CalibrationStarted {
            asset_id: self.id.clone(),
        }
    }

    fn data_event(&self, reading: &Reading) -> MonitorEvent {
        MonitorEvent::Data {
            asset_id: self.id.clone(),
            reading: EnrichedReading {
                reading: reading.clone(),
                natural_frequency: self.baseline(),
                is_calibrated: self.is_calibrated(),
            },
        }
    }
}
