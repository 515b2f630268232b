//! Remote store access
//!
//! The hosted back-end is the single source of truth for messages and the
//! cleanup log. Everything the manager needs from it goes through the
//! [`RemoteStore`] trait:
//!
//! ```text
//! CleanupService ─┐
//! AutoCleanupMonitor ─┼─→ RemoteStore ─→ RestStore (PostgREST over reqwest)
//! MaintenanceService ─┘              └─→ MemoryStore (tests)
//! ```
//!
//! The trait returns boxed futures so it stays object safe and can be shared
//! as `Arc<dyn RemoteStore>`.

#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod rest;

#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryStore;
pub use rest::RestStore;

use chrono::{NaiveDate, NaiveDateTime};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupType {
    Auto,
    Manual,
}

/// One row of the append-only cleanup log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupLogEntry {
    pub created_at: String,
    #[serde(default)]
    pub messages_deleted: u64,
    #[serde(default)]
    pub hack_messages_deleted: u64,
    pub cleanup_type: CleanupType,
}

impl CleanupLogEntry {
    /// `created_at` is written as the naive wall-clock timestamp so the
    /// date prefix read back later is the same calendar day the clock saw.
    pub fn new(
        now: NaiveDateTime,
        messages_deleted: u64,
        hack_messages_deleted: u64,
        cleanup_type: CleanupType,
    ) -> Self {
        Self {
            created_at: now.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            messages_deleted,
            hack_messages_deleted,
            cleanup_type,
        }
    }

    /// Calendar date taken from the leading `YYYY-MM-DD` of `created_at`
    pub fn created_on(&self) -> Option<NaiveDate> {
        let prefix = self.created_at.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

/// Row of the `maintenance_status` view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceStatusRow {
    pub in_maintenance: bool,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub check_time: String,
}

pub trait RemoteStore: Send + Sync {
    /// Delete every row of `table`, returning the number of rows removed
    fn delete_all<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<u64, StoreError>>;

    /// Invoke a stored procedure without arguments
    fn call_procedure<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Value, StoreError>>;

    /// Most recent cleanup log entry by `created_at`
    fn latest_cleanup_log(&self) -> BoxFuture<'_, Result<Option<CleanupLogEntry>, StoreError>>;

    fn append_cleanup_log<'a>(
        &'a self,
        entry: &'a CleanupLogEntry,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn count_rows<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<u64, StoreError>>;

    fn maintenance_status(&self) -> BoxFuture<'_, Result<Option<MaintenanceStatusRow>, StoreError>>;
}
