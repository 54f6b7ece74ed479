//! Liveness Scenarios
//!
//! The liveness sweep demotes silent bridges while readings keep arriving
//! for others. Sweeps must never disturb calibration or history.

use std::sync::Arc;

use bridgewatch_signal::{Connectivity, MonitorEvent};

use crate::test_utils::{axes_for, TestFleet};

#[tokio::test]
async fn test_silent_bridge_goes_offline_after_timeout() {
    let fleet = TestFleet::new().await;
    fleet.feed(0.2, 0).await;
    fleet.sink.clear();

    // Nine seconds of silence: still online
    assert!(fleet.service.sweep_liveness(9_000).await.is_empty());
    // Eleven seconds: demoted
    assert_eq!(
        fleet.service.sweep_liveness(11_000).await,
        vec![fleet.asset_id.clone()]
    );

    assert_eq!(
        fleet.sink.events(),
        vec![MonitorEvent::Connectivity {
            asset_id: fleet.asset_id.clone(),
            state: Connectivity::Offline,
            last_seen_at: Some(0),
        }]
    );
}

#[tokio::test]
async fn test_never_seen_bridge_is_not_reported() {
    let fleet = TestFleet::new().await;
    assert!(fleet.service.sweep_liveness(1_000_000).await.is_empty());
    assert!(fleet.sink.events().is_empty());
}

#[tokio::test]
async fn test_reading_brings_bridge_back_online() {
    let fleet = TestFleet::new().await;
    fleet.feed(0.2, 0).await;
    fleet.service.sweep_liveness(20_000).await;

    fleet.feed(0.2, 21_000).await;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert_eq!(view.asset.state.connectivity, Connectivity::Online);
    assert_eq!(view.asset.state.last_seen_at, Some(21_000));
}

#[tokio::test]
async fn test_sweep_leaves_calibration_untouched() {
    let fleet = TestFleet::new().await;
    fleet.feed_all(&vec![0.2; 30], 0).await;
    let before = fleet.service.get_asset(&fleet.asset_id).await.unwrap();

    fleet.service.sweep_liveness(60_000).await;
    let after = fleet.service.get_asset(&fleet.asset_id).await.unwrap();

    assert_eq!(after.asset.state.calibration, before.asset.state.calibration);
    assert_eq!(after.asset.state.history, before.asset.state.history);
    assert_eq!(after.asset.state.connectivity, Connectivity::Offline);

    // Calibration resumes where it left off
    fleet.feed_all(&vec![0.2; 20], 61_000).await;
    let view = fleet.service.get_asset(&fleet.asset_id).await.unwrap();
    assert!(view.asset.state.is_calibrated());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingestion_and_sweeps() {
    let fleet = Arc::new(TestFleet::new().await);
    let second = fleet.add_bridge("Tabuk Bridge").await;
    let bridges = vec![fleet.asset_id.clone(), second];

    let mut tasks = Vec::new();
    for bridge in bridges.clone() {
        let service = Arc::clone(&fleet.service);
        tasks.push(tokio::spawn(async move {
            let axes = axes_for(0.2);
            for i in 0..120u64 {
                service
                    .observe_reading(&bridge, axes.x, axes.y, axes.z, 1_000 + i)
                    .await
                    .unwrap();
            }
        }));
    }

    let sweeper = {
        let service = Arc::clone(&fleet.service);
        tokio::spawn(async move {
            for _ in 0..50 {
                // Same clock as the readings: nothing is ever stale
                service.sweep_liveness(2_000).await;
                tokio::task::yield_now().await;
            }
        })
    };

    for task in tasks {
        task.await.unwrap();
    }
    sweeper.await.unwrap();

    for bridge in &bridges {
        let view = fleet.service.get_asset(bridge).await.unwrap();
        assert_eq!(view.asset.state.history.len(), 120);
        assert!(view.asset.state.is_calibrated());
        assert_eq!(view.asset.state.connectivity, Connectivity::Online);

        // Per-bridge arrival order preserved
        let timestamps: Vec<u64> = view.asset.state.history.iter().map(|r| r.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    }
    assert_eq!(fleet.sink.count_on("calibration-complete"), 2);
}
