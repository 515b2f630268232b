// File: manager/src/web/mod.rs
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::scheduler::{AutoCleanupMonitor, MonitorSettings};
use crate::services::{CleanupService, MaintenanceService};
use crate::store::RemoteStore;
use crate::warning::MaintenanceWarning;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cleanup_service: Arc<CleanupService>,
    pub maintenance_service: Arc<MaintenanceService>,
    // Background loops, started and stopped by main
    pub monitor: AutoCleanupMonitor,
    pub warning: MaintenanceWarning,
}

impl AppState {
    /// Wire services and loops over one store and one clock
    pub fn new(config: Arc<Config>, store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>) -> Self {
        let lead = chrono::Duration::minutes(config.warning.lead_minutes);

        let cleanup_service = Arc::new(CleanupService::new(store.clone(), clock.clone()));
        let maintenance_service = Arc::new(MaintenanceService::new(
            store.clone(),
            clock.clone(),
            lead,
        ));

        let monitor = AutoCleanupMonitor::new(
            cleanup_service.clone(),
            store,
            clock.clone(),
            MonitorSettings::from(&config.monitor),
        );

        let warning = MaintenanceWarning::new(
            clock,
            lead,
            std::time::Duration::from_secs(config.warning.poll_interval_seconds),
        );

        Self {
            config,
            cleanup_service,
            maintenance_service,
            monitor,
            warning,
        }
    }
}
