// Maintenance window, status and warning endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;

use super::common::{ApiResponse, ApiResult};
use crate::services::{MaintenanceSnapshot, MaintenanceStatus};
use crate::warning::WarningState;
use crate::web::AppState;

pub async fn get_maintenance_info(State(state): State<AppState>) -> ApiResult<MaintenanceSnapshot> {
    Ok(Json(ApiResponse::success(
        state.maintenance_service.snapshot(),
    )))
}

/// Remote status row, or the local window when the store has none
pub async fn get_maintenance_status(
    State(state): State<AppState>,
) -> ApiResult<MaintenanceStatus> {
    let status = state.maintenance_service.check_maintenance_status().await;
    Ok(Json(ApiResponse::success(status)))
}

#[derive(Debug, Deserialize)]
pub struct WarningQuery {
    pub client_id: Option<String>,
}

/// Polled warning state, with the caller's own dismissal applied when a
/// `client_id` is given
pub async fn get_maintenance_warning(
    State(state): State<AppState>,
    Query(query): Query<WarningQuery>,
) -> ApiResult<WarningState> {
    let warning = match query.client_id.as_deref() {
        Some(client_id) => state.warning.current_for(client_id).await,
        None => state.warning.current().await,
    };
    Ok(Json(ApiResponse::success(warning)))
}

pub async fn dismiss_maintenance_warning(
    State(state): State<AppState>,
    Query(query): Query<WarningQuery>,
) -> ApiResult<WarningState> {
    let client_id = query.client_id.unwrap_or_default();

    match state.warning.dismiss(&client_id).await {
        Ok(warning) => {
            info!("Maintenance warning dismissed by client {}", client_id);
            Ok(Json(ApiResponse::success(warning)))
        }
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}
