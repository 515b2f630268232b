// Cleanup entry points and cleanup status endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::{error, info};

use super::common::{ApiResponse, ApiResult};
use crate::scheduler::MonitorStatus;
use crate::services::{CleanupResult, TableCounts};
use crate::store::CleanupType;
use crate::web::middleware::CleanupAuth;
use crate::web::AppState;

/// 200 with the camelCase result, or 500 with the error
fn cleanup_response(result: CleanupResult) -> Response {
    if result.success {
        return (StatusCode::OK, Json(result)).into_response();
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": result.error.unwrap_or_else(|| "Cleanup failed".to_string()),
            "timestamp": result.timestamp,
        })),
    )
        .into_response()
}

pub async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

pub async fn run_manual_cleanup(_auth: CleanupAuth, State(state): State<AppState>) -> Response {
    info!("Manual cleanup requested");

    let result = state.cleanup_service.run_full_cleanup().await;
    state
        .cleanup_service
        .record(&result, CleanupType::Manual)
        .await;

    cleanup_response(result)
}

/// Daily cleanup triggered by an external scheduler
pub async fn run_daily_cleanup(_auth: CleanupAuth, State(state): State<AppState>) -> Response {
    info!("Daily cleanup requested");

    let result = state.cleanup_service.run_full_cleanup().await;
    state.cleanup_service.record(&result, CleanupType::Auto).await;

    cleanup_response(result)
}

pub async fn clear_hack_messages(_auth: CleanupAuth, State(state): State<AppState>) -> Response {
    info!("Hack message clear requested");
    cleanup_response(state.cleanup_service.clear_hack_messages().await)
}

pub async fn get_monitor_status(State(state): State<AppState>) -> ApiResult<MonitorStatus> {
    Ok(Json(ApiResponse::success(state.monitor.status().await)))
}

pub async fn get_cleanup_schedule(State(state): State<AppState>) -> ApiResult<Option<Value>> {
    let schedule = state.maintenance_service.cleanup_schedule().await;
    Ok(Json(ApiResponse::success(schedule)))
}

pub async fn get_cleanup_stats(State(state): State<AppState>) -> ApiResult<TableCounts> {
    match state.maintenance_service.table_counts().await {
        Ok(counts) => Ok(Json(ApiResponse::success(counts))),
        Err(e) => {
            error!("Failed to count chat rows: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            ))
        }
    }
}
