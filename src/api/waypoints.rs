//! Waypoint-set handlers. Reading a single set needs any authenticated
//! caller; everything else is admin-only.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::{ApiError, ApiResponse, AppState, auth::AuthContext, types::*};
use crate::domain::Role;
use crate::domain::validation::WaypointDraft;
use crate::services::UpsertWaypointSet;

pub async fn list_waypoint_sets(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<WaypointSetSummaryDto>>>, ApiError> {
    auth.require(Role::Admin)?;

    let sets = state.waypoints.list().await?;
    Ok(Json(ApiResponse::success(
        sets.into_iter().map(Into::into).collect(),
    )))
}

pub async fn get_waypoint_set(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<WaypointSetDto>>, ApiError> {
    let set = state.waypoints.get(&name).await?;
    Ok(Json(ApiResponse::success(set.into())))
}

pub async fn create_waypoint_set(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<WaypointSetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WaypointSetDto>>), ApiError> {
    auth.require(Role::Admin)?;

    let set = state.waypoints.create(to_upsert(payload)).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(set.into()))))
}

pub async fn update_waypoint_set(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
    Json(payload): Json<WaypointSetRequest>,
) -> Result<Json<ApiResponse<WaypointSetDto>>, ApiError> {
    auth.require(Role::Admin)?;

    let set = state.waypoints.update(&name, to_upsert(payload)).await?;
    Ok(Json(ApiResponse::success(set.into())))
}

pub async fn delete_waypoint_set(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require(Role::Admin)?;

    state.waypoints.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn waypoint_set_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Vec<WaypointSetDto>>>, ApiError> {
    auth.require(Role::Admin)?;

    let versions = state.waypoints.history(&name).await?;
    Ok(Json(ApiResponse::success(
        versions.into_iter().map(Into::into).collect(),
    )))
}

fn to_upsert(payload: WaypointSetRequest) -> UpsertWaypointSet {
    UpsertWaypointSet {
        name: payload.waypoint_name,
        description: payload.description,
        waypoints: payload
            .waypoints
            .into_iter()
            .map(|entry| WaypointDraft {
                seq_order: entry.seq,
                latitude: entry.lat,
                longitude: entry.long,
                radius: entry.radius,
                clue: entry.clue,
                hints: entry.hints,
                image_subject: entry.image_subject,
            })
            .collect(),
    }
}
