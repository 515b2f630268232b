//! Common test data and constants

use chrono::{FixedOffset, NaiveDate, TimeZone};
use exochat_manager::clock::ManualClock;
use exochat_manager::store::{CleanupLogEntry, CleanupType};
use std::sync::Arc;

/// Manual clock at 2025-06-`day` `hour`:`minute` in UTC
pub fn clock_at(day: u32, hour: u32, minute: u32) -> Arc<ManualClock> {
    let start = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 6, day, hour, minute, 0)
        .unwrap();
    Arc::new(ManualClock::new(start))
}

/// Cleanup log entry written at 2025-06-`day` `hour`:`minute`
pub fn log_entry(day: u32, hour: u32, minute: u32, cleanup_type: CleanupType) -> CleanupLogEntry {
    let at = NaiveDate::from_ymd_opt(2025, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    CleanupLogEntry::new(at, 25, 3, cleanup_type)
}

/// Common test days
pub mod days {
    pub const YESTERDAY: u32 = 14;
    pub const TODAY: u32 = 15;
}

/// Tokens used against the web API
pub mod tokens {
    pub const CLEANUP: &str = "test-cleanup-token";
    pub const WRONG: &str = "not-the-token";
    pub const ACCESS_KEY: &str = "test-service-role-key";
}
