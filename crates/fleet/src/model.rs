//! Fleet records
//!
//! These types are both the snapshot document written to disk and the JSON
//! shapes served to the dashboard. Field names are camelCase on the wire and
//! regions keep their assets under `bridges`.

use bridgewatch_core::{AssetId, MonitorConfig, RegionId};
use bridgewatch_signal::AssetState;
use serde::{Deserialize, Serialize};

/// Descriptive data attached to an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfile {
    /// Display name
    pub name: String,
    /// Free-form location text
    #[serde(default)]
    pub location: String,
    /// Owning region
    pub region_id: RegionId,
}

/// A registered asset: profile plus monitoring state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredAsset {
    /// Descriptive data
    #[serde(flatten)]
    pub profile: AssetProfile,
    /// Signal state machine
    #[serde(flatten)]
    pub state: AssetState,
    /// Set once the asset has been removed from the registry
    #[serde(skip)]
    deleted: bool,
}

impl MonitoredAsset {
    /// Create a fresh, uncalibrated, offline asset.
    pub fn new(id: AssetId, profile: AssetProfile, config: &MonitorConfig) -> Self {
        Self {
            profile,
            state: AssetState::new(id, config),
            deleted: false,
        }
    }

    /// True once the asset has been deleted. Handles cloned before the
    /// deletion still reach the record, which must then be left alone.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Asset identifier.
    pub fn id(&self) -> &str {
        &self.state.id
    }
}

/// Region with its full asset records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region identifier
    pub id: RegionId,
    /// Display name
    pub name: String,
    /// Assets in this region
    #[serde(rename = "bridges", alias = "assets", default)]
    pub assets: Vec<MonitoredAsset>,
}

/// Region id and name only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Region identifier
    pub id: RegionId,
    /// Display name
    pub name: String,
}

impl From<&Region> for RegionSummary {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id.clone(),
            name: region.name.clone(),
        }
    }
}

/// Asset snapshot as returned by a single-asset lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    /// The asset record
    #[serde(flatten)]
    pub asset: MonitoredAsset,
    /// Name of the owning region
    pub region_name: Option<String>,
}

/// Whole-fleet document persisted to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Regions in creation order
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl FleetSnapshot {
    /// Demo regions created on first start.
    pub fn seeded() -> Self {
        Self {
            regions: vec![
                Region {
                    id: "region_riyadh".to_string(),
                    name: "Riyadh Region".to_string(),
                    assets: Vec::new(),
                },
                Region {
                    id: "region_tabuk".to_string(),
                    name: "Tabuk Region".to_string(),
                    assets: Vec::new(),
                },
            ],
        }
    }

    /// Number of assets across all regions.
    pub fn asset_count(&self) -> usize {
        self.regions.iter().map(|r| r.assets.len()).sum()
    }

    /// Insert or replace a region's name; assets are kept.
    pub fn upsert_region(&mut self, summary: RegionSummary) {
        match self.regions.iter_mut().find(|r| r.id == summary.id) {
            Some(region) => region.name = summary.name,
            None => self.regions.push(Region {
                id: summary.id,
                name: summary.name,
                assets: Vec::new(),
            }),
        }
    }

    /// Insert or replace an asset under its profile's region.
    ///
    /// Returns false when the region is unknown.
    pub fn upsert_asset(&mut self, asset: MonitoredAsset) -> bool {
        let Some(region) = self
            .regions
            .iter_mut()
            .find(|r| r.id == asset.profile.region_id)
        else {
            return false;
        };

        match region.assets.iter_mut().find(|a| a.id() == asset.id()) {
            Some(existing) => *existing = asset,
            None => region.assets.push(asset),
        }
        true
    }

    /// Remove an asset from whichever region holds it.
    pub fn remove_asset(&mut self, asset_id: &str) -> Option<MonitoredAsset> {
        for region in &mut self.regions {
            if let Some(pos) = region.assets.iter().position(|a| a.id() == asset_id) {
                return Some(region.assets.remove(pos));
            }
        }
        None
    }
}
