//! Test utilities for cross-crate integration tests

use std::sync::{Arc, Mutex};

use bridgewatch_core::{AssetId, MonitorConfig, RegionId};
use bridgewatch_fleet::{EventSink, MonitorService, Registry, SnapshotHandle};
use bridgewatch_signal::{Axes, MonitorEvent, GRAVITY};

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("warn")
        .try_init();
}

/// Axes whose vibration is exactly `vibration` above rest gravity
pub fn axes_for(vibration: f64) -> Axes {
    Axes {
        x: 0.0,
        y: 0.0,
        z: GRAVITY + vibration,
    }
}

/// Sink that keeps every published event for inspection
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MonitorEvent>>,
}

impl RecordingSink {
    /// All events published so far
    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Channels of all events published so far, in order
    pub fn channels(&self) -> Vec<String> {
        self.events().iter().map(MonitorEvent::channel).collect()
    }

    /// Number of events published on `channel`
    pub fn count_on(&self, channel: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.channel() == channel)
            .count()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: MonitorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A service with one region and one registered bridge
pub struct TestFleet {
    pub service: Arc<MonitorService>,
    pub sink: Arc<RecordingSink>,
    pub region_id: RegionId,
    pub asset_id: AssetId,
}

impl TestFleet {
    /// Fleet with default monitor settings and persistence disabled
    pub async fn new() -> Self {
        Self::with_config(MonitorConfig::default(), SnapshotHandle::disabled()).await
    }

    /// Fleet with explicit settings and snapshot hand-off
    pub async fn with_config(config: MonitorConfig, snapshots: SnapshotHandle) -> Self {
        init_test_logging();

        let sink = Arc::new(RecordingSink::default());
        let service = Arc::new(MonitorService::new(
            Registry::new(config),
            sink.clone(),
            snapshots,
        ));
        let region = service.create_region("Riyadh Region").await.unwrap();
        let asset = service
            .create_asset("King Fahd Bridge", "Riyadh", &region.id)
            .await
            .unwrap();

        Self {
            service,
            sink,
            region_id: region.id,
            asset_id: asset.state.id,
        }
    }

    /// Register another bridge in the same region
    pub async fn add_bridge(&self, name: &str) -> AssetId {
        self.service
            .create_asset(name, "", &self.region_id)
            .await
            .unwrap()
            .state
            .id
    }

    /// Feed `vibration` to the default bridge at `now`
    pub async fn feed(&self, vibration: f64, now: u64) {
        let axes = axes_for(vibration);
        self.service
            .observe_reading(&self.asset_id, axes.x, axes.y, axes.z, now)
            .await
            .unwrap();
    }

    /// Feed one value per millisecond starting at `start`
    pub async fn feed_all(&self, vibrations: &[f64], start: u64) {
        for (i, &v) in vibrations.iter().enumerate() {
            self.feed(v, start + i as u64).await;
        }
    }

    /// Feed the calibration window with a constant vibration
    pub async fn calibrate(&self, vibration: f64, start: u64) {
        let samples = self.service.config().calibration_samples as usize;
        self.feed_all(&vec![vibration; samples], start).await;
    }
}
