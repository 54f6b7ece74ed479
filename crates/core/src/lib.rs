//! Core functionality shared by every bridgewatch crate.
//!
//! This crate provides the error type, monitor configuration, logging
//! bootstrap and the id/time helpers used across the workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::MonitorConfig;
pub use error::{CoreError, Result};
pub use types::{current_timestamp_ms, format_time_of_day, AssetId, RegionId, TimestampMs};
