//! Calibration Scenarios
//!
//! Drives a registered bridge through its calibration window via the
//! ingestion service and checks the learned baseline, the events produced
//! and the recalibration path.

use bridgewatch_signal::{CalibrationPhase, MonitorEvent, Severity};

use crate::test_utils::TestFleet;

#[tokio::test]
async fn test_fifty_readings_complete_calibration() {
    let fleet = TestFleet::new().await;

    fleet.feed_all(&vec![0.2; 49], 1_000).await;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert!(!view.asset.state.is_calibrated());
    assert_eq!(view.asset.state.calibration.sample_count(), Some(49));
    assert_eq!(fleet.sink.count_on("calibration-complete"), 0);

    fleet.feed(0.2, 2_000).await;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    let baseline = view.asset.state.baseline().unwrap();
    assert!((baseline - 0.2).abs() < 1e-9);
    assert_eq!(view.asset.state.history.len(), 50);
    assert!(view.asset.state.alerts.is_empty());
    assert_eq!(fleet.sink.count_on("calibration-complete"), 1);
}

#[tokio::test]
async fn test_baseline_is_mean_of_window() {
    let fleet = TestFleet::new().await;
    let samples: Vec<f64> = (0..50).map(|i| 0.1 + (i % 5) as f64 * 0.05).collect();
    fleet.feed_all(&samples, 0).await;

    let expected = samples.iter().sum::<f64>() / samples.len() as f64;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert!((view.asset.state.baseline().unwrap() - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_calibration_completes_exactly_once() {
    let fleet = TestFleet::new().await;
    fleet.calibrate(0.2, 0).await;
    fleet.feed_all(&vec![0.2; 30], 100).await;

    assert_eq!(fleet.sink.count_on("calibration-complete"), 1);
    let completed: Vec<MonitorEvent> = fleet
        .sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, MonitorEvent::CalibrationCompleted { .. }))
        .collect();
    assert_eq!(completed[0].asset_id(), fleet.asset_id);
}

#[tokio::test]
async fn test_completion_event_precedes_data_event() {
    let fleet = TestFleet::new().await;
    fleet.feed_all(&vec![0.2; 49], 0).await;
    fleet.sink.clear();

    fleet.feed(0.2, 49).await;
    assert_eq!(
        fleet.sink.channels(),
        vec![
            "calibration-complete".to_string(),
            format!("data-{}", fleet.asset_id),
            "bridges-status".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_calibration_readings_never_alert() {
    let fleet = TestFleet::new().await;
    // Wild swings during calibration must not raise anything
    let samples: Vec<f64> = (0..49).map(|i| if i % 2 == 0 { 0.1 } else { 5.0 }).collect();
    fleet.feed_all(&samples, 0).await;

    assert_eq!(fleet.sink.count_on(&format!("alert-{}", fleet.asset_id)), 0);
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert!(view.asset.state.alerts.is_empty());
    assert!(view
        .asset
        .state
        .history
        .iter()
        .all(|r| r.severity() == Severity::Normal));
}

#[tokio::test]
async fn test_all_zero_calibration_is_deferred() {
    let fleet = TestFleet::new().await;
    fleet.calibrate(0.0, 0).await;
    fleet.feed_all(&[0.0; 10], 100).await;

    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert!(!view.asset.state.is_calibrated());
    assert_eq!(view.asset.state.calibration.sample_count(), Some(49));
    assert_eq!(fleet.sink.count_on("calibration-complete"), 0);

    // No NaN or infinite values reached the data channel
    for event in fleet.sink.events() {
        if let MonitorEvent::Data { reading, .. } = event {
            assert!(reading.reading.vibration.is_finite());
            assert!(reading.reading.deviation().is_none());
        }
    }

    // One non-zero reading finishes calibration
    fleet.feed(1.0, 500).await;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    let baseline = view.asset.state.baseline().unwrap();
    assert!(baseline > 0.0 && baseline.is_finite());
}

#[tokio::test]
async fn test_recalibration_restarts_window() {
    let fleet = TestFleet::new().await;
    fleet.calibrate(0.2, 0).await;
    fleet.feed(1.0, 100).await;

    fleet.service.recalibrate(&fleet.asset_id).await.unwrap();
    fleet.service.recalibrate(&fleet.asset_id).await.unwrap();

    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert_eq!(view.asset.state.calibration, CalibrationPhase::default());
    assert!(view.asset.state.history.is_empty());
    assert!(view.asset.state.alerts.is_empty());
    assert_eq!(fleet.sink.count_on("calibration-start"), 2);

    // A new baseline is learned from fresh readings only
    fleet.calibrate(0.4, 200).await;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert!((view.asset.state.baseline().unwrap() - 0.4).abs() < 1e-9);
    assert_eq!(fleet.sink.count_on("calibration-complete"), 2);
}
