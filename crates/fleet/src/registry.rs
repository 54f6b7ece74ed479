//! Asset and region registry
//!
//! Regions live behind one `RwLock`; each asset has its own `Mutex` so
//! readings for different assets never contend. The asset map lock is held
//! only long enough to clone an asset's `Arc`.
//!
//! Lock order is regions, then the asset map, then a single asset.
//!
//! A deleted asset is marked under its own lock before that lock is
//! released, so a task that cloned the handle earlier sees the mark through
//! [`lock_live`] instead of reviving the record.

use std::collections::HashMap;
use std::sync::Arc;

use bridgewatch_core::types::{generate_asset_id, generate_region_id};
use bridgewatch_core::{AssetId, CoreError, MonitorConfig, RegionId, Result, TimestampMs};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::info;

use crate::model::{AssetProfile, AssetView, FleetSnapshot, MonitoredAsset, Region, RegionSummary};

/// Shared handle to one asset record
pub type AssetHandle = Arc<Mutex<MonitoredAsset>>;

/// Lock an asset through a previously obtained handle.
///
/// Fails with `NotFound` if the asset was deleted after the handle was
/// cloned.
pub async fn lock_live(handle: &AssetHandle) -> Result<MutexGuard<'_, MonitoredAsset>> {
    let asset = handle.lock().await;
    if asset.is_deleted() {
        return Err(CoreError::asset_not_found(asset.id()));
    }
    Ok(asset)
}

#[derive(Debug, Clone)]
struct RegionEntry {
    id: RegionId,
    name: String,
    asset_ids: Vec<AssetId>,
}

/// In-memory registry of regions and assets
pub struct Registry {
    config: MonitorConfig,
    regions: RwLock<Vec<RegionEntry>>,
    assets: RwLock<HashMap<AssetId, AssetHandle>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            regions: RwLock::new(Vec::new()),
            assets: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a registry from a persisted snapshot.
    ///
    /// Stored capacities are replaced by the configured ones; assets whose id
    /// repeats an earlier one are dropped.
    pub fn from_snapshot(snapshot: FleetSnapshot, config: MonitorConfig) -> Self {
        let mut regions = Vec::with_capacity(snapshot.regions.len());
        let mut assets = HashMap::new();

        for region in snapshot.regions {
            let mut asset_ids = Vec::with_capacity(region.assets.len());
            for mut asset in region.assets {
                if assets.contains_key(asset.id()) {
                    continue;
                }
                asset.profile.region_id = region.id.clone();
                asset.state.apply_capacities(&config);
                asset_ids.push(asset.state.id.clone());
                assets.insert(asset.state.id.clone(), Arc::new(Mutex::new(asset)));
            }
            regions.push(RegionEntry {
                id: region.id,
                name: region.name,
                asset_ids,
            });
        }

        info!(
            regions = regions.len(),
            assets = assets.len(),
            "Registry restored from snapshot"
        );

        Self {
            config,
            regions: RwLock::new(regions),
            assets: RwLock::new(assets),
        }
    }

    /// Monitor configuration applied to new assets.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Look up an asset handle.
    pub async fn asset(&self, asset_id: &str) -> Result<AssetHandle> {
        self.assets
            .read()
            .await
            .get(asset_id)
            .cloned()
            .ok_or_else(|| CoreError::asset_not_found(asset_id))
    }

    /// Handles to every asset, in no particular order.
    pub async fn asset_handles(&self) -> Vec<AssetHandle> {
        self.assets.read().await.values().cloned().collect()
    }

    /// Number of registered assets.
    pub async fn asset_count(&self) -> usize {
        self.assets.read().await.len()
    }

    /// Full snapshot of every region with its assets.
    pub async fn list_regions(&self) -> Vec<Region> {
        let regions = self.regions.read().await.clone();
        let mut out = Vec::with_capacity(regions.len());

        for entry in regions {
            let mut assets = Vec::with_capacity(entry.asset_ids.len());
            for asset_id in &entry.asset_ids {
                // Deleted between the two reads
                if let Ok(handle) = self.asset(asset_id).await {
                    if let Ok(asset) = lock_live(&handle).await {
                        assets.push(asset.clone());
                    }
                }
            }
            out.push(Region {
                id: entry.id,
                name: entry.name,
                assets,
            });
        }
        out
    }

    /// Region ids and names only.
    pub async fn region_summaries(&self) -> Vec<RegionSummary> {
        self.regions
            .read()
            .await
            .iter()
            .map(|r| RegionSummary {
                id: r.id.clone(),
                name: r.name.clone(),
            })
            .collect()
    }

    /// Whole registry as a persistable document.
    pub async fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            regions: self.list_regions().await,
        }
    }

    /// Create an empty region.
    pub async fn create_region(&self, name: &str, now: TimestampMs) -> Result<RegionSummary> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("region name is required".to_string()));
        }

        let mut regions = self.regions.write().await;
        let mut stamp = now;
        let mut id = generate_region_id(stamp);
        while regions.iter().any(|r| r.id == id) {
            stamp += 1;
            id = generate_region_id(stamp);
        }

        regions.push(RegionEntry {
            id: id.clone(),
            name: name.to_string(),
            asset_ids: Vec::new(),
        });
        info!(region_id = %id, name, "Region created");

        Ok(RegionSummary {
            id,
            name: name.to_string(),
        })
    }

    /// Register a new asset in an existing region.
    pub async fn create_asset(
        &self,
        name: &str,
        location: &str,
        region_id: &str,
        now: TimestampMs,
    ) -> Result<MonitoredAsset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("bridge name is required".to_string()));
        }
        if region_id.is_empty() {
            return Err(CoreError::Validation("region id is required".to_string()));
        }

        let mut regions = self.regions.write().await;
        let region = regions
            .iter_mut()
            .find(|r| r.id == region_id)
            .ok_or_else(|| CoreError::region_not_found(region_id))?;

        let mut assets = self.assets.write().await;
        let mut id = generate_asset_id(now);
        while assets.contains_key(&id) {
            id = generate_asset_id(now);
        }

        let asset = MonitoredAsset::new(
            id.clone(),
            AssetProfile {
                name: name.to_string(),
                location: location.trim().to_string(),
                region_id: region_id.to_string(),
            },
            &self.config,
        );
        assets.insert(id.clone(), Arc::new(Mutex::new(asset.clone())));
        region.asset_ids.push(id.clone());
        info!(asset_id = %id, region_id, name, "Bridge registered");

        Ok(asset)
    }

    /// Consistent copy of one asset plus its region's name.
    pub async fn get_asset(&self, asset_id: &str) -> Result<AssetView> {
        let handle = self.asset(asset_id).await?;
        let asset = lock_live(&handle).await?.clone();
        let region_name = self
            .regions
            .read()
            .await
            .iter()
            .find(|r| r.id == asset.profile.region_id)
            .map(|r| r.name.clone());

        Ok(AssetView { asset, region_name })
    }

    /// Remove an asset. Returns the removed record.
    pub async fn delete_asset(&self, asset_id: &str) -> Result<MonitoredAsset> {
        let mut regions = self.regions.write().await;
        let handle = self
            .assets
            .write()
            .await
            .remove(asset_id)
            .ok_or_else(|| CoreError::asset_not_found(asset_id))?;

        for region in regions.iter_mut() {
            region.asset_ids.retain(|id| id != asset_id);
        }
        drop(regions);

        let mut asset = handle.lock().await;
        let removed = asset.clone();
        asset.mark_deleted();
        info!(asset_id, "Bridge deleted");
        Ok(removed)
    }
}
