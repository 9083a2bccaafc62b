//! HTTP surface: health, entity states and the OAuth callback

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use fcon_auth::{callback_router, ApiError, CallbackState};
use fcon_core::VehicleData;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::coordinator::{Phase, UpdateFailure};
use crate::entity::{DeviceInfo, EntityState};
use crate::setup::Integration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub integration: Arc<Integration>,
}

impl AppState {
    pub fn new(integration: Arc<Integration>) -> Self {
        Self { integration }
    }
}

/// GET /api/vehicle
#[derive(Debug, Serialize)]
pub struct VehicleStatus {
    pub entry_id: String,
    pub vin: String,
    pub device: DeviceInfo,
    pub last_update_success: bool,
    pub stale: bool,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<UpdateFailure>,
    pub entities: Vec<EntityState>,
}

/// Build the router for one integration plus the OAuth callback
pub fn create_router(state: AppState, callback: CallbackState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/vehicle", get(vehicle_status))
        .route("/api/vehicle/data", get(vehicle_data))
        .route("/api/vehicle/entities/{unique_id}", get(entity_state))
        .with_state(state)
        .merge(callback_router(callback))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn vehicle_status(State(state): State<AppState>) -> Json<VehicleStatus> {
    let integration = &state.integration;
    let snapshot = integration.coordinator().snapshot();
    let platform = integration.platform().read();

    Json(VehicleStatus {
        entry_id: integration.entry().entry_id.clone(),
        vin: integration.entry().vin.clone(),
        device: platform.device().clone(),
        last_update_success: snapshot.last_update_success,
        stale: snapshot.stale,
        phase: snapshot.phase,
        last_success_at: snapshot.last_success_at,
        last_failure: snapshot.last_failure,
        entities: platform.states(),
    })
}

/// Current normalized record
async fn vehicle_data(State(state): State<AppState>) -> Result<Json<VehicleData>, ApiError> {
    state
        .integration
        .coordinator()
        .data()
        .map(|data| Json(VehicleData::clone(&data)))
        .ok_or_else(|| ApiError::ServiceUnavailable("No telemetry received yet".to_string()))
}

async fn entity_state(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> Result<Json<EntityState>, ApiError> {
    state
        .integration
        .platform()
        .read()
        .state(&unique_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Entity not found: {}", unique_id)))
}
