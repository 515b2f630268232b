//! In-process store with failure injection, used by the test suites

use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{CleanupLogEntry, MaintenanceStatusRow, RemoteStore};
use crate::constants::store;
use crate::errors::StoreError;

#[derive(Default)]
struct MemoryState {
    rows: HashMap<String, u64>,
    cleanup_log: Vec<CleanupLogEntry>,
    maintenance_status: Option<MaintenanceStatusRow>,
    procedure_overrides: HashMap<String, Result<Value, StoreError>>,
    delete_failures: HashMap<String, StoreError>,
    count_failures: HashMap<String, StoreError>,
    log_read_failure: Option<StoreError>,
    log_append_failure: Option<StoreError>,
    status_failure: Option<StoreError>,
    procedure_calls: Vec<String>,
    delete_calls: Vec<String>,
    log_reads: usize,
}

/// Row counts per table plus an append-only cleanup log.
///
/// `trigger_manual_cleanup` and `clear_hack_messages` behave like the real
/// procedures unless overridden; every other procedure returns `[]`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &str, count: u64) -> Self {
        self.state.get_mut().rows.insert(table.to_string(), count);
        self
    }

    pub fn with_log_entry(mut self, entry: CleanupLogEntry) -> Self {
        self.state.get_mut().cleanup_log.push(entry);
        self
    }

    pub fn with_maintenance_status(mut self, row: MaintenanceStatusRow) -> Self {
        self.state.get_mut().maintenance_status = Some(row);
        self
    }

    pub async fn set_procedure_result(&self, name: &str, result: Result<Value, StoreError>) {
        self.state
            .lock()
            .await
            .procedure_overrides
            .insert(name.to_string(), result);
    }

    pub async fn fail_procedure(&self, name: &str, reason: &str) {
        let error = StoreError::Transport {
            operation: format!("rpc {}", name),
            reason: reason.to_string(),
        };
        self.set_procedure_result(name, Err(error)).await;
    }

    pub async fn fail_delete(&self, table: &str, reason: &str) {
        let error = StoreError::Remote {
            operation: format!("delete from {}", table),
            status: 403,
            code: Some("42501".to_string()),
            message: reason.to_string(),
        };
        self.state
            .lock()
            .await
            .delete_failures
            .insert(table.to_string(), error);
    }

    pub async fn fail_count(&self, table: &str, reason: &str) {
        let error = StoreError::Transport {
            operation: format!("count {}", table),
            reason: reason.to_string(),
        };
        self.state
            .lock()
            .await
            .count_failures
            .insert(table.to_string(), error);
    }

    pub async fn fail_log_read(&self, error: StoreError) {
        self.state.lock().await.log_read_failure = Some(error);
    }

    pub async fn fail_log_append(&self, reason: &str) {
        self.state.lock().await.log_append_failure = Some(StoreError::Transport {
            operation: format!("insert into {}", store::CLEANUP_LOG_TABLE),
            reason: reason.to_string(),
        });
    }

    pub async fn fail_maintenance_status(&self, reason: &str) {
        self.state.lock().await.status_failure = Some(StoreError::Transport {
            operation: format!("read {}", store::MAINTENANCE_STATUS_TABLE),
            reason: reason.to_string(),
        });
    }

    pub async fn row_count(&self, table: &str) -> u64 {
        self.state.lock().await.rows.get(table).copied().unwrap_or(0)
    }

    pub async fn log_entries(&self) -> Vec<CleanupLogEntry> {
        self.state.lock().await.cleanup_log.clone()
    }

    pub async fn procedure_calls(&self) -> Vec<String> {
        self.state.lock().await.procedure_calls.clone()
    }

    /// Number of times `name` was invoked
    pub async fn procedure_call_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .await
            .procedure_calls
            .iter()
            .filter(|call| call.as_str() == name)
            .count()
    }

    pub async fn delete_calls(&self) -> Vec<String> {
        self.state.lock().await.delete_calls.clone()
    }

    pub async fn log_reads(&self) -> usize {
        self.state.lock().await.log_reads
    }
}

fn take_rows(state: &mut MemoryState, table: &str) -> u64 {
    state.rows.insert(table.to_string(), 0).unwrap_or(0)
}

impl RemoteStore for MemoryStore {
    fn delete_all<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        async move {
            let mut state = self.state.lock().await;
            state.delete_calls.push(table.to_string());

            if let Some(error) = state.delete_failures.get(table) {
                return Err(error.clone());
            }

            Ok(take_rows(&mut state, table))
        }
        .boxed()
    }

    fn call_procedure<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Value, StoreError>> {
        async move {
            let mut state = self.state.lock().await;
            state.procedure_calls.push(name.to_string());

            if let Some(result) = state.procedure_overrides.get(name) {
                return result.clone();
            }

            match name {
                store::TRIGGER_CLEANUP_PROCEDURE => {
                    let messages = take_rows(&mut state, store::MESSAGES_TABLE);
                    let hack = take_rows(&mut state, store::HACK_MESSAGES_TABLE);
                    Ok(json!([{
                        "messages_deleted": messages,
                        "hack_messages_deleted": hack,
                        "cleanup_time": "2025-01-01T00:00:00+00:00"
                    }]))
                }
                store::CLEAR_HACK_MESSAGES_PROCEDURE => {
                    let hack = take_rows(&mut state, store::HACK_MESSAGES_TABLE);
                    Ok(json!([{ "hack_messages_deleted": hack }]))
                }
                _ => Ok(json!([])),
            }
        }
        .boxed()
    }

    fn latest_cleanup_log(&self) -> BoxFuture<'_, Result<Option<CleanupLogEntry>, StoreError>> {
        async move {
            let mut state = self.state.lock().await;
            state.log_reads += 1;

            if let Some(error) = &state.log_read_failure {
                return Err(error.clone());
            }

            Ok(state
                .cleanup_log
                .iter()
                .max_by(|a, b| a.created_at.cmp(&b.created_at))
                .cloned())
        }
        .boxed()
    }

    fn append_cleanup_log<'a>(
        &'a self,
        entry: &'a CleanupLogEntry,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            let mut state = self.state.lock().await;

            if let Some(error) = &state.log_append_failure {
                return Err(error.clone());
            }

            state.cleanup_log.push(entry.clone());
            Ok(())
        }
        .boxed()
    }

    fn count_rows<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        async move {
            let state = self.state.lock().await;

            if let Some(error) = state.count_failures.get(table) {
                return Err(error.clone());
            }

            Ok(state.rows.get(table).copied().unwrap_or(0))
        }
        .boxed()
    }

    fn maintenance_status(&self) -> BoxFuture<'_, Result<Option<MaintenanceStatusRow>, StoreError>> {
        async move {
            let state = self.state.lock().await;

            if let Some(error) = &state.status_failure {
                return Err(error.clone());
            }

            Ok(state.maintenance_status.clone())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_procedure_drains_both_tables() {
        let memory = MemoryStore::new()
            .with_rows(store::MESSAGES_TABLE, 12)
            .with_rows(store::HACK_MESSAGES_TABLE, 3);

        let value = memory
            .call_procedure(store::TRIGGER_CLEANUP_PROCEDURE)
            .await
            .unwrap();

        assert_eq!(value[0]["messages_deleted"], 12);
        assert_eq!(value[0]["hack_messages_deleted"], 3);
        assert_eq!(memory.row_count(store::MESSAGES_TABLE).await, 0);
        assert_eq!(memory.row_count(store::HACK_MESSAGES_TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_rows() {
        let memory = MemoryStore::new().with_rows(store::HACK_MESSAGES_TABLE, 5);
        memory.fail_delete(store::HACK_MESSAGES_TABLE, "permission denied").await;

        assert!(memory.delete_all(store::HACK_MESSAGES_TABLE).await.is_err());
        assert_eq!(memory.row_count(store::HACK_MESSAGES_TABLE).await, 5);
        assert_eq!(memory.delete_calls().await, vec!["hack_messages".to_string()]);
    }
}
