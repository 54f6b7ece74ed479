//! Calibration engine
//!
//! An uncalibrated asset learns its baseline ("natural frequency") from its
//! first N readings. On the Nth reading the baseline is the mean vibration of
//! the last N-1 readings stored in history plus the current one.
//!
//! Two conditions refuse the transition and keep the asset collecting:
//! - the history window holds fewer than N-1 readings (the mean would be
//!   taken over fewer than N true samples);
//! - the computed baseline is zero or non-finite, which would make every
//!   later deviation ratio undefined.
//!
//! In both cases the window slides: the sample count drops back to N-1 so the
//! next reading is again the Nth.
//!
//! The running sum is carried for progress reporting only; the baseline is
//! always recomputed from history.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::history::HistoryRing;

/// Calibration phase of an asset. The transition to `Calibrated` is one-way;
/// only an explicit recalibration returns to `Uncalibrated`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum CalibrationPhase {
    /// Collecting baseline samples
    #[serde(rename_all = "camelCase")]
    Uncalibrated {
        /// Samples counted towards the current window
        sample_count: u32,
        /// Sum of the vibrations counted by `sample_count`. Informational;
        /// the baseline is taken from history.
        accumulated_sum: f64,
    },
    /// Baseline learned
    Calibrated {
        /// Mean vibration over the calibration window, always > 0
        baseline: f64,
    },
}

impl Default for CalibrationPhase {
    fn default() -> Self {
        CalibrationPhase::Uncalibrated {
            sample_count: 0,
            accumulated_sum: 0.0,
        }
    }
}

/// Outcome of one calibration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    /// Still below the sample target
    InProgress,
    /// Baseline computed; the phase is now `Calibrated`
    Completed {
        /// The learned baseline
        baseline: f64,
    },
    /// Target reached but the transition was refused
    Deferred {
        /// Why the baseline was not accepted
        reason: DeferReason,
    },
}

/// Reason a completed sample window did not produce a baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferReason {
    /// History held fewer than N-1 readings
    ShortHistory {
        /// Readings available in history
        available: usize,
    },
    /// Mean vibration was zero or not finite
    DegenerateBaseline {
        /// The rejected value
        candidate: f64,
    },
}

/// Result of feeding one vibration value to the calibration engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationStep {
    /// Samples counted after this step
    pub sample_count: u32,
    /// `min(100, sample_count / N * 100)` as observed by this step
    pub progress_percent: f64,
    /// What happened
    pub outcome: CalibrationOutcome,
}

impl CalibrationStep {
    /// Baseline if this step completed calibration.
    pub fn baseline(&self) -> Option<f64> {
        match self.outcome {
            CalibrationOutcome::Completed { baseline } => Some(baseline),
            _ => None,
        }
    }

    /// True if this step completed calibration.
    pub fn is_complete(&self) -> bool {
        self.baseline().is_some()
    }
}

impl CalibrationPhase {
    /// True once a baseline has been learned.
    pub fn is_calibrated(&self) -> bool {
        matches!(self, CalibrationPhase::Calibrated { .. })
    }

    /// The learned baseline, if any.
    pub fn baseline(&self) -> Option<f64> {
        match self {
            CalibrationPhase::Calibrated { baseline } => Some(*baseline),
            CalibrationPhase::Uncalibrated { .. } => None,
        }
    }

    /// Samples counted so far; `None` once calibrated.
    pub fn sample_count(&self) -> Option<u32> {
        match self {
            CalibrationPhase::Uncalibrated { sample_count, .. } => Some(*sample_count),
            CalibrationPhase::Calibrated { .. } => None,
        }
    }

    /// Return to the start of calibration.
    pub fn reset(&mut self) {
        *self = CalibrationPhase::default();
    }

    /// Feed one vibration value.
    ///
    /// `history` must hold the readings accepted before this one; the current
    /// reading is appended by the caller after this step. Calling this on a
    /// calibrated phase is a no-op reporting 100% progress.
    pub fn observe(&mut self, vibration: f64, history: &HistoryRing, target: u32) -> CalibrationStep {
        let (sample_count, accumulated_sum) = match *self {
            CalibrationPhase::Uncalibrated {
                sample_count,
                accumulated_sum,
            } => (sample_count + 1, accumulated_sum + vibration),
            CalibrationPhase::Calibrated { .. } => {
                return CalibrationStep {
                    sample_count: target,
                    progress_percent: 100.0,
                    outcome: CalibrationOutcome::InProgress,
                };
            }
        };

        let progress_percent = progress(sample_count, target);

        if sample_count < target {
            *self = CalibrationPhase::Uncalibrated {
                sample_count,
                accumulated_sum,
            };
            return CalibrationStep {
                sample_count,
                progress_percent,
                outcome: CalibrationOutcome::InProgress,
            };
        }

        let window = target.saturating_sub(1) as usize;
        match baseline_from_window(vibration, history, window, target) {
            Ok(baseline) => {
                info!(baseline, samples = target, "Calibration complete");
                *self = CalibrationPhase::Calibrated { baseline };
                CalibrationStep {
                    sample_count,
                    progress_percent,
                    outcome: CalibrationOutcome::Completed { baseline },
                }
            }
            Err(reason) => {
                match reason {
                    DeferReason::ShortHistory { available } => warn!(
                        available,
                        required = window,
                        "Calibration window incomplete in history, continuing to collect samples"
                    ),
                    DeferReason::DegenerateBaseline { candidate } => warn!(
                        candidate,
                        "Calibration produced a degenerate baseline, continuing to collect samples"
                    ),
                }
                // Held window: the newest N-2 stored readings plus this one
                let held = target - 1;
                let held_sum =
                    history.recent_vibrations(window.saturating_sub(1)).sum::<f64>() + vibration;
                *self = CalibrationPhase::Uncalibrated {
                    sample_count: held,
                    accumulated_sum: held_sum,
                };
                CalibrationStep {
                    sample_count: held,
                    progress_percent,
                    outcome: CalibrationOutcome::Deferred { reason },
                }
            }
        }
    }
}

fn baseline_from_window(
    vibration: f64,
    history: &HistoryRing,
    window: usize,
    target: u32,
) -> std::result::Result<f64, DeferReason> {
    if history.len() < window {
        return Err(DeferReason::ShortHistory {
            available: history.len(),
        });
    }

    let sum: f64 = history.recent_vibrations(window).sum::<f64>() + vibration;
    let baseline = sum / target as f64;
    if baseline.is_finite() && baseline > 0.0 {
        Ok(baseline)
    } else {
        Err(DeferReason::DegenerateBaseline {
            candidate: baseline,
        })
    }
}

fn progress(sample_count: u32, target: u32) -> f64 {
    (sample_count as f64 / target as f64 * 100.0).min(100.0)
}
