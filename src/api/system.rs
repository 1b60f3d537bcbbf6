use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::api::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub version: String,
    pub database: bool,
    pub uptime_secs: u64,
}

/// `GET /api/system/health`
pub async fn get_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthDto>>, ApiError> {
    let database = state.store.ping().await.is_ok();

    Ok(Json(ApiResponse::success(HealthDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        uptime_secs: state.start_time.elapsed().as_secs(),
    })))
}
