//! Alerting Scenarios
//!
//! Calibrated bridges grade each reading against the baseline. These tests
//! check the severity thresholds end to end along with the bounded alert and
//! history logs.

use bridgewatch_core::MonitorConfig;
use bridgewatch_fleet::SnapshotHandle;
use bridgewatch_signal::{MonitorEvent, Severity};

use crate::test_utils::TestFleet;

async fn calibrated_fleet() -> TestFleet {
    let fleet = TestFleet::new().await;
    fleet.calibrate(1.0, 0).await;
    fleet.sink.clear();
    fleet
}

#[tokio::test]
async fn test_severity_thresholds() {
    let fleet = calibrated_fleet().await;

    // +100% is critical, +50% is warning, +40% is normal
    let cases = [(2.5, Severity::Critical), (1.6, Severity::Warning), (1.4, Severity::Normal)];
    for (i, (vibration, expected)) in cases.into_iter().enumerate() {
        fleet.feed(vibration, 1_000 + i as u64).await;
        let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
        let latest = view.asset.state.history.latest().unwrap();
        assert_eq!(latest.severity(), expected, "vibration {vibration}");
    }

    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert_eq!(view.asset.state.alerts.len(), 2);
    assert_eq!(
        view.asset.state.alerts.latest().unwrap().severity,
        Severity::Warning
    );
}

#[tokio::test]
async fn test_alert_event_follows_data_event() {
    let fleet = calibrated_fleet().await;
    fleet.feed(3.0, 1_000).await;

    assert_eq!(
        fleet.sink.channels(),
        vec![
            format!("data-{}", fleet.asset_id),
            format!("alert-{}", fleet.asset_id),
            "bridges-status".to_string(),
        ]
    );

    match &fleet.sink.events()[1] {
        MonitorEvent::Alert { alert, .. } => {
            assert_eq!(alert.severity, Severity::Critical);
            assert_eq!(alert.message, "Critical vibration level");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_data_payload_carries_baseline() {
    let fleet = calibrated_fleet().await;
    fleet.feed(1.0, 1_000).await;

    let payload = fleet.sink.events()[0].payload().unwrap();
    assert_eq!(payload["isCalibrated"], true);
    assert!((payload["naturalFrequency"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(payload["analysis"]["alert"], false);
}

#[tokio::test]
async fn test_alert_log_keeps_newest_twenty() {
    let fleet = calibrated_fleet().await;
    for i in 0..25u64 {
        fleet.feed(3.0, 10_000 + i * 1_000).await;
    }

    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    let alerts: Vec<u64> = view.asset.state.alerts.iter().map(|a| a.timestamp).collect();
    assert_eq!(alerts.len(), 20);
    assert_eq!(alerts[0], 34_000);
    assert_eq!(alerts[19], 15_000);
}

#[tokio::test]
async fn test_history_keeps_newest_two_hundred() {
    let fleet = calibrated_fleet().await;
    for i in 0..250u64 {
        fleet.feed(1.0, 10_000 + i).await;
    }

    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    let history = &view.asset.state.history;
    assert_eq!(history.len(), 200);
    assert_eq!(history.iter().next().unwrap().timestamp, 10_050);
    assert_eq!(history.latest().unwrap().timestamp, 10_249);
}

#[tokio::test]
async fn test_custom_thresholds() {
    let config = MonitorConfig {
        warning_ratio: 0.2,
        critical_ratio: 0.4,
        ..MonitorConfig::default()
    };
    let fleet = TestFleet::with_config(config, SnapshotHandle::disabled()).await;
    fleet.calibrate(1.0, 0).await;

    fleet.feed(1.3, 1_000).await;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert_eq!(
        view.asset.state.history.latest().unwrap().severity(),
        Severity::Warning
    );
}
