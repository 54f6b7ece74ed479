//! Integration tests for the bridgewatch monitoring pipeline
//!
//! This test suite validates, across the signal and fleet crates:
//! - Calibration over the first N readings and the one-way transition
//! - Deviation grading and alert bookkeeping on calibrated assets
//! - Liveness demotion while ingestion runs concurrently
//! - Snapshot persistence and registry restore

pub mod test_utils;

#[cfg(test)]
mod calibration_scenarios;

#[cfg(test)]
mod alerting_scenarios;

#[cfg(test)]
mod liveness_scenarios;

#[cfg(test)]
mod persistence_scenarios;
