//! Base Info API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use shared::models::BaseInfo;
use shared::{AppError, AppResult};

/// GET /base-info/ - public platform statistics
pub async fn base_info(State(state): State<ServerState>) -> AppResult<Json<BaseInfo>> {
    let info = state
        .stats()
        .base_info()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(info))
}
