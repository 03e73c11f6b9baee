use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
}

pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthStatus>>, ApiError> {
    let database = match state.store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!("Health check database ping failed: {e}");
            "unavailable".to_string()
        }
    };

    let status = if database == "ok" { "ok" } else { "degraded" };

    Ok(Json(ApiResponse::success(HealthStatus {
        status: status.to_string(),
        database,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })))
}
