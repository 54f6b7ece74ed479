use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use bridgewatch_core::{current_timestamp_ms, CoreError};
use bridgewatch_fleet::{AssetView, MonitoredAsset, Region, RegionSummary};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateRegionRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateBridgeRequest {
    pub name: String,
    pub location: String,
    pub region_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedBridge {
    pub message: &'static str,
    pub bridge: MonitoredAsset,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "bridgewatch-node",
        "bridges": state.service.registry().asset_count().await,
        "feedSubscribers": state.events.receiver_count(),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn list_regions(State(state): State<Arc<AppState>>) -> Json<Vec<Region>> {
    Json(state.service.list_regions().await)
}

pub async fn region_summaries(State(state): State<Arc<AppState>>) -> Json<Vec<RegionSummary>> {
    Json(state.service.region_summaries().await)
}

pub async fn create_region(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRegionRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let region = state.service.create_region(&request.name).await?;

    Ok(Json(json!({
        "message": "Region created",
        "region": {
            "id": region.id,
            "name": region.name,
            "bridges": []
        }
    })))
}

pub async fn create_bridge(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBridgeRequest>, JsonRejection>,
) -> ApiResult<Json<CreatedBridge>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let bridge = state
        .service
        .create_asset(&request.name, &request.location, &request.region_id)
        .await?;

    Ok(Json(CreatedBridge {
        message: "Bridge created",
        bridge,
    }))
}

pub async fn get_bridge(
    State(state): State<Arc<AppState>>,
    Path(bridge_id): Path<String>,
) -> ApiResult<Json<AssetView>> {
    Ok(Json(state.service.get_asset(&bridge_id).await?))
}

pub async fn recalibrate_bridge(
    State(state): State<Arc<AppState>>,
    Path(bridge_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.service.recalibrate(&bridge_id).await?;
    Ok(Json(json!({ "message": "Calibration started" })))
}

pub async fn delete_bridge(
    State(state): State<Arc<AppState>>,
    Path(bridge_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.service.delete_asset(&bridge_id).await?;
    Ok(Json(json!({ "message": "Bridge deleted" })))
}

pub async fn ingest_reading(
    State(state): State<Arc<AppState>>,
    Path(bridge_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let (x, y, z) = payload
        .ok()
        .and_then(|Json(body)| Some((axis(&body, "x")?, axis(&body, "y")?, axis(&body, "z")?)))
        .ok_or_else(|| {
            CoreError::InvalidReading("x, y and z must be numbers".to_string())
        })?;

    let outcome = state
        .service
        .observe_reading(&bridge_id, x, y, z, current_timestamp_ms())
        .await?;
    debug!(
        bridge_id = %bridge_id,
        vibration = outcome.reading.vibration,
        "Reading accepted"
    );

    Ok(Json(json!({ "status": "ok" })))
}

fn axis(body: &Value, name: &str) -> Option<f64> {
    body.get(name).and_then(Value::as_f64)
}
