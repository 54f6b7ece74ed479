//! Fleet - multi-asset monitoring for bridgewatch
//!
//! Wraps the per-asset state machine from `bridgewatch-signal` with:
//! - A region/asset registry with per-asset locking
//! - The ingestion service and periodic liveness sweep
//! - Event sinks (broadcast fan-out)
//! - Best-effort snapshot persistence to a JSON document

#![warn(missing_docs)]

pub mod model;
pub mod registry;
pub mod service;
pub mod sink;
pub mod store;

pub use model::{AssetProfile, AssetView, FleetSnapshot, MonitoredAsset, Region, RegionSummary};
pub use registry::{lock_live, AssetHandle, Registry};
pub use service::MonitorService;
pub use sink::{BroadcastSink, EventSink, DEFAULT_EVENT_BUFFER};
pub use store::{
    load_or_seed, JsonFileStore, PersistCommand, SnapshotHandle, SnapshotStore, SnapshotWriter,
    StoreError,
};
