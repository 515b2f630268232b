// File: manager/src/web/server.rs
use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub async fn start_web_server<F>(state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === CLEANUP ENTRY POINTS (TOKEN REQUIRED, POST ONLY) ===
        .route(
            "/api/cleanup",
            post(handlers::run_manual_cleanup).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/daily-cleanup",
            post(handlers::run_daily_cleanup).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/hack-messages/clear",
            post(handlers::clear_hack_messages).fallback(handlers::method_not_allowed),
        )
        // === CLEANUP STATUS ROUTES ===
        .route("/api/cleanup/monitor", get(handlers::get_monitor_status))
        .route("/api/cleanup/schedule", get(handlers::get_cleanup_schedule))
        .route("/api/cleanup/stats", get(handlers::get_cleanup_stats))
        // === MAINTENANCE WINDOW ROUTES ===
        .route("/api/maintenance/info", get(handlers::get_maintenance_info))
        .route(
            "/api/maintenance/status",
            get(handlers::get_maintenance_status),
        )
        .route(
            "/api/maintenance/warning",
            get(handlers::get_maintenance_warning),
        )
        .route(
            "/api/maintenance/warning/dismiss",
            post(handlers::dismiss_maintenance_warning),
        )
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
