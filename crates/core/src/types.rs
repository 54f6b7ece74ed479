//! Core types: identifiers and time helpers

use chrono::DateTime;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable identifier of a monitored asset (bridge)
pub type AssetId = String;

/// Stable identifier of a region grouping assets
pub type RegionId = String;

/// Unix epoch milliseconds
pub type TimestampMs = u64;

/// Get current timestamp in milliseconds.
pub fn current_timestamp_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Render a timestamp as `HH:MM:SS` (UTC) for display.
pub fn format_time_of_day(timestamp_ms: TimestampMs) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms as i64) {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => String::from("--:--:--"),
    }
}

/// Generate a region id of the form `region_<ms>`.
pub fn generate_region_id(now_ms: TimestampMs) -> RegionId {
    format!("region_{now_ms}")
}

/// Generate an asset id of the form `bridge_<ms>_<5 lowercase alphanumerics>`.
pub fn generate_asset_id(now_ms: TimestampMs) -> AssetId {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("bridge_{now_ms}_{suffix}")
}
