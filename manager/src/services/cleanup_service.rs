// File: manager/src/services/cleanup_service.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::constants::store;
use crate::errors::StoreError;
use crate::store::{CleanupLogEntry, CleanupType, RemoteStore};

/// Outcome of one cleanup attempt. Never persisted, only summarised into
/// the cleanup log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub success: bool,
    pub messages_deleted: u64,
    pub hack_messages_deleted: u64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CleanupResult {
    fn succeeded(messages_deleted: u64, hack_messages_deleted: u64, timestamp: String) -> Self {
        Self {
            success: true,
            messages_deleted,
            hack_messages_deleted,
            timestamp,
            error: None,
        }
    }

    fn failed(error: String, timestamp: String) -> Self {
        Self {
            success: false,
            messages_deleted: 0,
            hack_messages_deleted: 0,
            timestamp,
            error: Some(error),
        }
    }
}

/// Row 0 of a cleanup procedure result. Missing fields count as zero.
#[derive(Debug, Default, Deserialize)]
struct ProcedureRow {
    messages_deleted: Option<u64>,
    hack_messages_deleted: Option<u64>,
    cleanup_time: Option<String>,
}

fn first_row(value: &Value) -> ProcedureRow {
    let row = match value {
        Value::Array(rows) => rows.first(),
        Value::Null => None,
        other => Some(other),
    };

    row.and_then(|row| serde_json::from_value(row.clone()).ok())
        .unwrap_or_default()
}

/// Deletes chat data in the remote store.
///
/// Every remote failure is converted into a failed [`CleanupResult`]; none
/// of these methods returns an error or panics, so polling loops can call
/// them without guarding.
pub struct CleanupService {
    store: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
}

impl CleanupService {
    pub fn new(store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn timestamp(&self) -> String {
        self.clock.now().to_rfc3339()
    }

    /// Run the `trigger_manual_cleanup` procedure. No fallback.
    pub async fn trigger_cleanup(&self) -> CleanupResult {
        match self
            .store
            .call_procedure(store::TRIGGER_CLEANUP_PROCEDURE)
            .await
        {
            Ok(value) => {
                let row = first_row(&value);
                let result = CleanupResult::succeeded(
                    row.messages_deleted.unwrap_or(0),
                    row.hack_messages_deleted.unwrap_or(0),
                    row.cleanup_time.unwrap_or_else(|| self.timestamp()),
                );
                info!(
                    "Cleanup procedure removed {} messages and {} hack messages",
                    result.messages_deleted, result.hack_messages_deleted
                );
                result
            }
            Err(e) => {
                warn!("Cleanup procedure failed: {}", e);
                CleanupResult::failed(e.to_string(), self.timestamp())
            }
        }
    }

    /// Clear the hack messages table, falling back to a direct delete-all
    pub async fn clear_hack_messages(&self) -> CleanupResult {
        match self
            .store
            .call_procedure(store::CLEAR_HACK_MESSAGES_PROCEDURE)
            .await
        {
            Ok(value) => {
                let deleted = first_row(&value).hack_messages_deleted.unwrap_or(0);
                info!("Cleared {} hack messages", deleted);
                CleanupResult::succeeded(0, deleted, self.timestamp())
            }
            Err(primary) => {
                warn!(
                    "Hack message procedure failed ({}), deleting rows directly",
                    primary
                );
                match self.fallback_delete(&[store::HACK_MESSAGES_TABLE]).await {
                    Ok(counts) => {
                        let deleted = counts.first().copied().unwrap_or(0);
                        info!("Fallback cleared {} hack messages", deleted);
                        CleanupResult::succeeded(0, deleted, self.timestamp())
                    }
                    Err(fallback) => {
                        error!("Fallback hack message delete also failed: {}", fallback);
                        CleanupResult::failed(fallback.to_string(), self.timestamp())
                    }
                }
            }
        }
    }

    /// Procedure first, then the same delete-all fallback over both tables.
    /// Used by the HTTP entry points and the daily job.
    pub async fn run_full_cleanup(&self) -> CleanupResult {
        let primary = self.trigger_cleanup().await;
        if primary.success {
            return primary;
        }

        warn!("Falling back to direct deletion of all chat data");

        let counts = match self
            .fallback_delete(&[store::MESSAGES_TABLE, store::HACK_MESSAGES_TABLE])
            .await
        {
            Ok(counts) => counts,
            Err(fallback) => {
                error!("Direct deletion failed: {}", fallback);
                return CleanupResult::failed(fallback.to_string(), self.timestamp());
            }
        };

        if let Err(e) = self
            .store
            .call_procedure(store::DAILY_CLEANUP_PROCEDURE)
            .await
        {
            warn!("Housekeeping procedure unavailable: {}", e);
        }

        let messages = counts.first().copied().unwrap_or(0);
        let hack = counts.get(1).copied().unwrap_or(0);
        info!(
            "Direct deletion removed {} messages and {} hack messages",
            messages, hack
        );

        CleanupResult::succeeded(messages, hack, self.timestamp())
    }

    /// Delete every row of each table in order; stops at the first failure
    async fn fallback_delete(&self, tables: &[&str]) -> Result<Vec<u64>, StoreError> {
        let mut counts = Vec::with_capacity(tables.len());
        for table in tables {
            counts.push(self.store.delete_all(table).await?);
        }
        Ok(counts)
    }

    /// Append a log entry for a successful run. Best effort: failures are
    /// logged and reported as `false`.
    pub async fn record(&self, result: &CleanupResult, cleanup_type: CleanupType) -> bool {
        if !result.success {
            return false;
        }

        if let Err(e) = self
            .store
            .call_procedure(store::ENSURE_CLEANUP_LOG_PROCEDURE)
            .await
        {
            debug!("Cleanup log table check skipped: {}", e);
        }

        let entry = CleanupLogEntry::new(
            self.clock.now().naive_local(),
            result.messages_deleted,
            result.hack_messages_deleted,
            cleanup_type,
        );

        match self.store.append_cleanup_log(&entry).await {
            Ok(()) => {
                debug!("Logged {:?} cleanup at {}", cleanup_type, entry.created_at);
                true
            }
            Err(e) => {
                error!("Error logging cleanup: {}", e);
                false
            }
        }
    }
}
