//! Persistence Scenarios
//!
//! Mutations are mirrored into a JSON document by the snapshot writer. A
//! registry rebuilt from that document must carry on where the old one
//! stopped.

use std::sync::Arc;

use bridgewatch_core::{CoreError, MonitorConfig};
use bridgewatch_fleet::{
    load_or_seed, FleetSnapshot, JsonFileStore, MonitorService, Registry, SnapshotHandle,
    SnapshotStore, SnapshotWriter,
};
use tempfile::TempDir;

use crate::test_utils::{axes_for, RecordingSink, TestFleet};

#[tokio::test]
async fn test_mutations_reach_the_document() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("data").join("bridges.json")));

    let (handle, writer) = SnapshotWriter::spawn(store.clone(), FleetSnapshot::default());
    let fleet = TestFleet::with_config(MonitorConfig::default(), handle).await;
    fleet.calibrate(0.2, 0).await;
    fleet.feed(1.0, 100).await;
    let asset_id = fleet.asset_id.clone();

    // Dropping the last handle lets the writer flush and stop
    drop(fleet);
    writer.await.unwrap();

    let stored = store.load().unwrap().unwrap();
    assert_eq!(stored.regions.len(), 1);
    let asset = &stored.regions[0].assets[0];
    assert_eq!(asset.state.id, asset_id);
    assert!(asset.state.is_calibrated());
    assert_eq!(asset.state.history.len(), 51);
    assert_eq!(asset.state.alerts.len(), 1);
}

#[tokio::test]
async fn test_restart_resumes_from_document() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("bridges.json")));

    let (handle, writer) = SnapshotWriter::spawn(store.clone(), FleetSnapshot::default());
    let fleet = TestFleet::with_config(MonitorConfig::default(), handle).await;
    fleet.feed_all(&vec![0.2; 30], 0).await;
    let asset_id = fleet.asset_id.clone();
    drop(fleet);
    writer.await.unwrap();

    // Second process lifetime
    let snapshot = load_or_seed(store.as_ref());
    let sink = Arc::new(RecordingSink::default());
    let service = MonitorService::new(
        Registry::from_snapshot(snapshot, MonitorConfig::default()),
        sink.clone(),
        SnapshotHandle::disabled(),
    );

    let axes = axes_for(0.2);
    for i in 0..20u64 {
        service
            .observe_reading(&asset_id, axes.x, axes.y, axes.z, 1_000 + i)
            .await
            .unwrap();
    }

    let view = service.get_asset(&asset_id).await.unwrap();
    assert!(view.asset.state.is_calibrated());
    assert_eq!(view.region_name.as_deref(), Some("Riyadh Region"));
    assert_eq!(sink.count_on("calibration-complete"), 1);
}

#[tokio::test]
async fn test_deleted_bridge_removed_from_document() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("bridges.json")));

    let (handle, writer) = SnapshotWriter::spawn(store.clone(), FleetSnapshot::default());
    let fleet = TestFleet::with_config(MonitorConfig::default(), handle).await;
    let keep = fleet.add_bridge("Tabuk Bridge").await;
    fleet.service.delete_asset(&fleet.asset_id).await.unwrap();
    drop(fleet);
    writer.await.unwrap();

    let stored = store.load().unwrap().unwrap();
    let ids: Vec<&str> = stored.regions[0].assets.iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec![keep.as_str()]);
}

#[tokio::test]
async fn test_extreme_readings_keep_document_loadable() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("bridges.json")));

    let (handle, writer) = SnapshotWriter::spawn(store.clone(), FleetSnapshot::default());
    let fleet = TestFleet::with_config(MonitorConfig::default(), handle).await;
    fleet.calibrate(0.2, 0).await;
    let asset_id = fleet.asset_id.clone();

    // Large but representable: stored as a finite critical reading
    let outcome = fleet
        .service
        .observe_reading(&asset_id, 1e200, 0.0, 0.0, 1_000)
        .await
        .unwrap();
    assert!(outcome.reading.vibration.is_finite());
    let alert = outcome.alert.unwrap();
    assert!(alert.risk_percent.is_finite());

    // Magnitude beyond f64 range: rejected, nothing stored
    let huge = f64::MAX / 1.5;
    let err = fleet
        .service
        .observe_reading(&asset_id, huge, huge, huge, 2_000)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidReading(_)));
    assert_eq!(fleet.sink.count_on(&format!("data-{asset_id}")), 51);

    drop(fleet);
    writer.await.unwrap();

    let stored = store.load().unwrap().unwrap();
    let asset = &stored.regions[0].assets[0];
    assert_eq!(asset.state.history.len(), 51);
    assert_eq!(asset.state.last_seen_at, Some(1_000));

    let restored = Registry::from_snapshot(load_or_seed(store.as_ref()), MonitorConfig::default());
    assert_eq!(restored.asset_count().await, 1);
}

#[test]
fn test_first_start_seeds_demo_regions() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("bridges.json"));

    let snapshot = load_or_seed(&store);
    let names: Vec<&str> = snapshot.regions.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Riyadh Region", "Tabuk Region"]);
    assert!(store.path().exists());
}
