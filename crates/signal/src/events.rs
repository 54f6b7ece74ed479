//! Monitor events
//!
//! Every state change an observer cares about is expressed as a
//! [`MonitorEvent`]. Events carry the channel they are published on so a
//! transport can route them without inspecting the payload.

use bridgewatch_core::{AssetId, TimestampMs};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::alerts::Alert;
use crate::reading::EnrichedReading;

/// Channel carrying calibration start notifications for every asset
pub const CALIBRATION_START_CHANNEL: &str = "calibration-start";
/// Channel carrying calibration completion notifications for every asset
pub const CALIBRATION_COMPLETE_CHANNEL: &str = "calibration-complete";
/// Channel carrying connectivity changes for every asset
pub const STATUS_CHANNEL: &str = "bridges-status";

/// Asset connectivity as seen by the liveness monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// A reading arrived within the offline timeout
    Online,
    /// No reading yet, or silent for longer than the offline timeout
    #[default]
    Offline,
}

/// Event published by the monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A processed reading
    Data {
        /// Source asset
        asset_id: AssetId,
        /// Reading plus calibration state
        reading: EnrichedReading,
    },

    /// An alert raised by a reading
    Alert {
        /// Source asset
        asset_id: AssetId,
        /// The recorded alert
        alert: Alert,
    },

    /// Calibration restarted
    CalibrationStarted {
        /// Asset being recalibrated
        asset_id: AssetId,
    },

    /// Baseline learned
    CalibrationCompleted {
        /// Calibrated asset
        asset_id: AssetId,
        /// Learned baseline
        baseline: f64,
    },

    /// Connectivity report
    Connectivity {
        /// Reporting asset
        asset_id: AssetId,
        /// New or confirmed state
        state: Connectivity,
        /// Last reading time, if any
        last_seen_at: Option<TimestampMs>,
    },
}

impl MonitorEvent {
    /// Asset the event concerns.
    pub fn asset_id(&self) -> &str {
        match self {
            MonitorEvent::Data { asset_id, .. }
            | MonitorEvent::Alert { asset_id, .. }
            | MonitorEvent::CalibrationStarted { asset_id }
            | MonitorEvent::CalibrationCompleted { asset_id, .. }
            | MonitorEvent::Connectivity { asset_id, .. } => asset_id,
        }
    }

    /// Channel name: `data-<id>`, `alert-<id>` or one of the shared channels.
    pub fn channel(&self) -> String {
        match self {
            MonitorEvent::Data { asset_id, .. } => format!("data-{asset_id}"),
            MonitorEvent::Alert { asset_id, .. } => format!("alert-{asset_id}"),
            MonitorEvent::CalibrationStarted { .. } => CALIBRATION_START_CHANNEL.to_string(),
            MonitorEvent::CalibrationCompleted { .. } => CALIBRATION_COMPLETE_CHANNEL.to_string(),
            MonitorEvent::Connectivity { .. } => STATUS_CHANNEL.to_string(),
        }
    }

    /// Dashboard payload for this event's channel.
    pub fn payload(&self) -> serde_json::Result<Value> {
        match self {
            MonitorEvent::Data { reading, .. } => serde_json::to_value(reading),
            MonitorEvent::Alert { alert, .. } => serde_json::to_value(alert),
            MonitorEvent::CalibrationStarted { asset_id } => Ok(Value::String(asset_id.clone())),
            MonitorEvent::CalibrationCompleted { asset_id, baseline } => Ok(json!({
                "bridgeId": asset_id,
                "frequency": baseline,
            })),
            MonitorEvent::Connectivity {
                asset_id,
                state,
                last_seen_at,
            } => Ok(json!({
                "bridgeId": asset_id,
                "status": state,
                "lastSeen": last_seen_at,
            })),
        }
    }
}
