//! Liveness monitor
//!
//! Demotes assets that stopped reporting. Only connectivity is touched;
//! calibration, history and alerts are left as they are.

use bridgewatch_core::{MonitorConfig, TimestampMs};
use tracing::info;

use crate::asset::AssetState;
use crate::events::{Connectivity, MonitorEvent};

/// Offline-timeout checker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessMonitor {
    offline_timeout_ms: u64,
}

impl LivenessMonitor {
    /// Create a monitor with an explicit timeout.
    pub fn new(offline_timeout_ms: u64) -> Self {
        Self { offline_timeout_ms }
    }

    /// Create a monitor from the monitor configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.offline_timeout_ms)
    }

    /// Check whether an asset has been silent longer than the timeout.
    pub fn is_expired(&self, state: &AssetState, now: TimestampMs) -> bool {
        match (state.connectivity, state.last_seen_at) {
            (Connectivity::Online, Some(last_seen)) => {
                now.saturating_sub(last_seen) > self.offline_timeout_ms
            }
            _ => false,
        }
    }

    /// Demote an expired asset to Offline.
    ///
    /// Returns the connectivity event to publish when a transition happened.
    pub fn check(&self, state: &mut AssetState, now: TimestampMs) -> Option<MonitorEvent> {
        if !self.is_expired(state, now) {
            return None;
        }

        state.connectivity = Connectivity::Offline;
        info!(
            asset_id = %state.id,
            last_seen_at = ?state.last_seen_at,
            "Asset went offline"
        );

        Some(MonitorEvent::Connectivity {
            asset_id: state.id.clone(),
            state: Connectivity::Offline,
            last_seen_at: state.last_seen_at,
        })
    }
}

impl Default for LivenessMonitor {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}
