//! Snapshot persistence
//!
//! Mutations are handed off as [`PersistCommand`]s through a
//! [`SnapshotHandle`]. A single writer task applies them to its own copy of
//! the [`FleetSnapshot`], drains whatever else is queued, then writes once.
//! Storage is best effort and last write wins; failures are logged and never
//! reach the caller that triggered them.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridgewatch_core::AssetId;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::model::{FleetSnapshot, MonitoredAsset, RegionSummary};

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage backend for the fleet document
pub trait SnapshotStore: Send + Sync {
    /// Load the stored document; `Ok(None)` when nothing was stored yet.
    fn load(&self) -> Result<Option<FleetSnapshot>, StoreError>;

    /// Replace the stored document.
    fn save(&self, snapshot: &FleetSnapshot) -> Result<(), StoreError>;
}

/// Pretty-printed JSON document on the local filesystem
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<FleetSnapshot>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, snapshot: &FleetSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Load the stored document, seeding the demo regions on first start.
///
/// An unreadable document is logged and replaced by an empty fleet.
pub fn load_or_seed(store: &dyn SnapshotStore) -> FleetSnapshot {
    match store.load() {
        Ok(Some(snapshot)) => {
            info!(
                regions = snapshot.regions.len(),
                assets = snapshot.asset_count(),
                "Loaded fleet snapshot"
            );
            snapshot
        }
        Ok(None) => {
            let snapshot = FleetSnapshot::seeded();
            if let Err(e) = store.save(&snapshot) {
                error!(error = %e, "Failed to save seeded fleet snapshot");
            }
            info!("No fleet snapshot found, seeded demo regions");
            snapshot
        }
        Err(e) => {
            error!(error = %e, "Failed to load fleet snapshot, starting empty");
            FleetSnapshot::default()
        }
    }
}

/// One mutation to mirror into storage
#[derive(Debug, Clone)]
pub enum PersistCommand {
    /// Insert or replace an asset record
    UpsertAsset(Box<MonitoredAsset>),
    /// Remove an asset record
    RemoveAsset(AssetId),
    /// Insert or rename a region
    UpsertRegion(RegionSummary),
}

impl PersistCommand {
    fn apply(self, snapshot: &mut FleetSnapshot) {
        match self {
            PersistCommand::UpsertAsset(asset) => {
                let asset_id = asset.state.id.clone();
                if !snapshot.upsert_asset(*asset) {
                    warn!(asset_id = %asset_id, "Snapshot has no region for asset, skipped");
                }
            }
            PersistCommand::RemoveAsset(asset_id) => {
                snapshot.remove_asset(&asset_id);
            }
            PersistCommand::UpsertRegion(region) => snapshot.upsert_region(region),
        }
    }
}

/// Fire-and-forget hand-off to the snapshot writer
#[derive(Debug, Clone, Default)]
pub struct SnapshotHandle {
    sender: Option<mpsc::UnboundedSender<PersistCommand>>,
}

impl SnapshotHandle {
    /// Handle that discards every command.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Queue a command. Never blocks.
    pub fn submit(&self, command: PersistCommand) {
        if let Some(sender) = &self.sender {
            if sender.send(command).is_err() {
                warn!("Snapshot writer stopped, mutation not persisted");
            }
        }
    }

    /// Queue an asset upsert.
    pub fn upsert_asset(&self, asset: MonitoredAsset) {
        self.submit(PersistCommand::UpsertAsset(Box::new(asset)));
    }

    /// Queue an asset removal.
    pub fn remove_asset(&self, asset_id: impl Into<AssetId>) {
        self.submit(PersistCommand::RemoveAsset(asset_id.into()));
    }

    /// Queue a region upsert.
    pub fn upsert_region(&self, region: RegionSummary) {
        self.submit(PersistCommand::UpsertRegion(region));
    }
}

/// Background writer owning the persisted copy of the fleet
pub struct SnapshotWriter;

impl SnapshotWriter {
    /// Spawn the writer task.
    ///
    /// The task exits once every [`SnapshotHandle`] has been dropped and the
    /// queue is empty.
    pub fn spawn(
        store: Arc<dyn SnapshotStore>,
        initial: FleetSnapshot,
    ) -> (SnapshotHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::run(store, initial, receiver));
        (
            SnapshotHandle {
                sender: Some(sender),
            },
            task,
        )
    }

    async fn run(
        store: Arc<dyn SnapshotStore>,
        mut snapshot: FleetSnapshot,
        mut receiver: mpsc::UnboundedReceiver<PersistCommand>,
    ) {
        while let Some(command) = receiver.recv().await {
            command.apply(&mut snapshot);
            let mut batched = 1usize;
            while let Ok(command) = receiver.try_recv() {
                command.apply(&mut snapshot);
                batched += 1;
            }

            let store = Arc::clone(&store);
            let document = snapshot.clone();
            match tokio::task::spawn_blocking(move || store.save(&document)).await {
                Ok(Ok(())) => debug!(commands = batched, "Fleet snapshot written"),
                Ok(Err(e)) => error!(error = %e, "Failed to write fleet snapshot"),
                Err(e) => error!(error = %e, "Snapshot write task failed"),
            }
        }
        info!("Snapshot writer stopped");
    }
}
