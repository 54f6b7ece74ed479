//! Signal - per-asset vibration monitoring state machine
//!
//! This crate turns raw accelerometer readings into calibrated, graded
//! readings for a single monitored asset. It handles:
//! - Reading normalization (3-axis acceleration to vibration magnitude)
//! - Baseline calibration over the first N readings
//! - Deviation analysis and severity grading against the baseline
//! - Bounded reading history (FIFO) and alert log (newest first)
//! - Liveness tracking (Online / Offline)
//!
//! Nothing here performs IO. State changes are reported as
//! [`MonitorEvent`]s for the caller to publish.
//!
//! # Examples
//!
//! ```
//! use bridgewatch_core::MonitorConfig;
//! use bridgewatch_signal::{AssetState, Axes};
//!
//! let config = MonitorConfig::default();
//! let mut state = AssetState::new("bridge_1", &config);
//! let axes = Axes::new(0.0, 0.0, 10.0).unwrap();
//! let outcome = state.observe(axes, 1_000, &config).unwrap();
//! assert!(!outcome.events.is_empty());
//! ```

#![warn(missing_docs)]

pub mod alerts;
pub mod asset;
pub mod calibration;
pub mod deviation;
pub mod events;
pub mod history;
pub mod liveness;
pub mod normalizer;
pub mod reading;

pub use alerts::{Alert, AlertLedger};
pub use asset::{AssetState, ReadingOutcome};
pub use calibration::{CalibrationOutcome, CalibrationPhase, CalibrationStep, DeferReason};
pub use deviation::{DeviationAnalyzer, DeviationResult, Severity};
pub use events::{Connectivity, MonitorEvent};
pub use history::HistoryRing;
pub use liveness::LivenessMonitor;
pub use normalizer::{Axes, GRAVITY};
pub use reading::{EnrichedReading, Reading, ReadingAnalysis};
