// File: manager/src/services/maintenance_service.rs
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::constants::store;
use crate::errors::StoreError;
use crate::store::RemoteStore;
use crate::window::{self, MaintenanceCountdown, MaintenanceInfo};

/// Where a maintenance status answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSource {
    Store,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceStatus {
    pub in_maintenance: bool,
    pub status_message: String,
    pub check_time: String,
    pub source: StatusSource,
}

/// Window evaluation at one instant, as shown to clients
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceSnapshot {
    pub now: String,
    #[serde(flatten)]
    pub info: MaintenanceInfo,
    pub countdown: Option<MaintenanceCountdown>,
    pub warning_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub messages: u64,
    pub hack_messages: u64,
    pub chat_rooms: u64,
    pub anonymous_rooms: u64,
}

/// Read-only maintenance queries
pub struct MaintenanceService {
    store: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    warning_lead: chrono::Duration,
}

impl MaintenanceService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        clock: Arc<dyn Clock>,
        warning_lead: chrono::Duration,
    ) -> Self {
        Self {
            store,
            clock,
            warning_lead,
        }
    }

    pub fn snapshot(&self) -> MaintenanceSnapshot {
        let now = self.clock.now();
        let wall = now.naive_local();

        MaintenanceSnapshot {
            now: now.to_rfc3339(),
            info: window::get_maintenance_info(wall),
            countdown: window::maintenance_countdown(wall),
            warning_active: window::should_show_maintenance_warning(wall, self.warning_lead),
        }
    }

    /// Status from the store's `maintenance_status` view, or the local
    /// window evaluation when the view is missing, empty or unreachable.
    pub async fn check_maintenance_status(&self) -> MaintenanceStatus {
        match self.store.maintenance_status().await {
            Ok(Some(row)) => {
                return MaintenanceStatus {
                    in_maintenance: row.in_maintenance,
                    status_message: row.status_message,
                    check_time: row.check_time,
                    source: StatusSource::Store,
                }
            }
            Ok(None) => debug!("Maintenance status view is empty, evaluating locally"),
            Err(e) if e.is_not_found() => {
                debug!("Maintenance status view unavailable, evaluating locally")
            }
            Err(e) => warn!("Maintenance status check failed, evaluating locally: {}", e),
        }

        self.local_status()
    }

    fn local_status(&self) -> MaintenanceStatus {
        let now = self.clock.now();
        let in_maintenance = window::is_in_maintenance_window(now.naive_local());

        MaintenanceStatus {
            in_maintenance,
            status_message: if in_maintenance {
                "System is under maintenance".to_string()
            } else {
                "System is operational".to_string()
            },
            check_time: now.to_rfc3339(),
            source: StatusSource::Local,
        }
    }

    /// First row of `get_cleanup_schedule_info`, `None` when unavailable
    pub async fn cleanup_schedule(&self) -> Option<Value> {
        match self
            .store
            .call_procedure(store::SCHEDULE_INFO_PROCEDURE)
            .await
        {
            Ok(Value::Array(rows)) => rows.into_iter().next(),
            Ok(Value::Null) => None,
            Ok(other) => Some(other),
            Err(e) => {
                error!("Error getting cleanup schedule: {}", e);
                None
            }
        }
    }

    /// Row counts for the stats endpoint. The message tables are required;
    /// room counts read as 0 when unavailable.
    pub async fn table_counts(&self) -> Result<TableCounts, StoreError> {
        let messages = self.store.count_rows(store::MESSAGES_TABLE).await?;
        let hack_messages = self.store.count_rows(store::HACK_MESSAGES_TABLE).await?;

        Ok(TableCounts {
            messages,
            hack_messages,
            chat_rooms: self.count_or_zero(store::CHAT_ROOMS_TABLE).await,
            anonymous_rooms: self.count_or_zero(store::ANONYMOUS_ROOMS_TABLE).await,
        })
    }

    async fn count_or_zero(&self, table: &str) -> u64 {
        match self.store.count_rows(table).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not count {}: {}", table, e);
                0
            }
        }
    }
}
