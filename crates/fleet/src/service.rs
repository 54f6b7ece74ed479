//! Monitoring service
//!
//! Entry point for every mutation of the fleet. Each operation runs under
//! the affected asset's own lock, publishes the resulting events in order,
//! and hands a snapshot to persistence. An asset deleted while a caller
//! waited for its lock is treated as unknown: nothing is published or
//! persisted for it.

use std::sync::Arc;

use bridgewatch_core::{current_timestamp_ms, AssetId, MonitorConfig, Result, TimestampMs};
use bridgewatch_signal::{Axes, LivenessMonitor, ReadingOutcome};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::model::{AssetView, MonitoredAsset, Region, RegionSummary};
use crate::registry::{lock_live, AssetHandle, Registry};
use crate::sink::EventSink;
use crate::store::SnapshotHandle;

/// Fleet-wide monitoring service
pub struct MonitorService {
    registry: Registry,
    sink: Arc<dyn EventSink>,
    snapshots: SnapshotHandle,
    liveness: LivenessMonitor,
}

impl MonitorService {
    /// Create a service over an existing registry.
    pub fn new(registry: Registry, sink: Arc<dyn EventSink>, snapshots: SnapshotHandle) -> Self {
        let liveness = LivenessMonitor::from_config(registry.config());
        Self {
            registry,
            sink,
            snapshots,
            liveness,
        }
    }

    /// Monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        self.registry.config()
    }

    /// Underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Process one reading for `asset_id`.
    ///
    /// Axis values are validated before the asset is looked up; an unknown
    /// asset or invalid reading leaves all state untouched.
    pub async fn observe_reading(
        &self,
        asset_id: &str,
        x: f64,
        y: f64,
        z: f64,
        now: TimestampMs,
    ) -> Result<ReadingOutcome> {
        let axes = Axes::new(x, y, z)?;
        let handle = self.registry.asset(asset_id).await?;
        self.observe_on(&handle, axes, now).await
    }

    async fn observe_on(
        &self,
        handle: &AssetHandle,
        axes: Axes,
        now: TimestampMs,
    ) -> Result<ReadingOutcome> {
        let mut asset = lock_live(handle).await?;
        let outcome = asset.state.observe(axes, now, self.config())?;
        for event in &outcome.events {
            self.sink.publish(event.clone());
        }
        self.snapshots.upsert_asset(asset.clone());

        Ok(outcome)
    }

    /// Restart calibration for `asset_id`.
    pub async fn recalibrate(&self, asset_id: &str) -> Result<()> {
        let handle = self.registry.asset(asset_id).await?;

        let mut asset = lock_live(&handle).await?;
        let event = asset.state.recalibrate();
        self.sink.publish(event);
        self.snapshots.upsert_asset(asset.clone());
        Ok(())
    }

    /// Demote every asset silent for longer than the offline timeout.
    ///
    /// Returns the ids that went offline.
    pub async fn sweep_liveness(&self, now: TimestampMs) -> Vec<AssetId> {
        let mut demoted = Vec::new();

        for handle in self.registry.asset_handles().await {
            let Ok(mut asset) = lock_live(&handle).await else {
                continue;
            };
            if let Some(event) = self.liveness.check(&mut asset.state, now) {
                self.sink.publish(event);
                self.snapshots.upsert_asset(asset.clone());
                demoted.push(asset.state.id.clone());
            }
        }

        if !demoted.is_empty() {
            debug!(count = demoted.len(), "Liveness sweep demoted assets");
        }
        demoted
    }

    /// Run the liveness sweep on the configured interval.
    pub fn spawn_liveness(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.config().sweep_interval();
        tokio::spawn(async move {
            info!(interval_ms = period.as_millis() as u64, "Liveness sweep started");
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                self.sweep_liveness(current_timestamp_ms()).await;
            }
        })
    }

    /// Full snapshot of every region with its assets.
    pub async fn list_regions(&self) -> Vec<Region> {
        self.registry.list_regions().await
    }

    /// Region ids and names.
    pub async fn region_summaries(&self) -> Vec<RegionSummary> {
        self.registry.region_summaries().await
    }

    /// Create a region and persist it.
    pub async fn create_region(&self, name: &str) -> Result<RegionSummary> {
        let region = self
            .registry
            .create_region(name, current_timestamp_ms())
            .await?;
        self.snapshots.upsert_region(region.clone());
        Ok(region)
    }

    /// Register an asset and persist it.
    pub async fn create_asset(
        &self,
        name: &str,
        location: &str,
        region_id: &str,
    ) -> Result<MonitoredAsset> {
        let asset = self
            .registry
            .create_asset(name, location, region_id, current_timestamp_ms())
            .await?;
        self.snapshots.upsert_asset(asset.clone());
        Ok(asset)
    }

    /// Asset snapshot with its region name.
    pub async fn get_asset(&self, asset_id: &str) -> Result<AssetView> {
        self.registry.get_asset(asset_id).await
    }

    /// Remove an asset and persist the removal. Emits no event.
    pub async fn delete_asset(&self, asset_id: &str) -> Result<()> {
        let removed = self.registry.delete_asset(asset_id).await?;
        self.snapshots.remove_asset(removed.state.id);
        Ok(())
    }
}
