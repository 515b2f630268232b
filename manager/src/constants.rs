//! Central repository for the maintenance window boundaries, polling
//! intervals and remote table names.
//!
//! Constants are grouped by concern so the scheduler, the evaluator and the
//! store client agree on a single source of truth.

use std::time::Duration;

/// Daily maintenance window, expressed in local wall-clock time
pub mod window {
    /// Hour in which the window opens (11 PM)
    pub const START_HOUR: u32 = 23;

    /// Minute at which the window opens
    pub const START_MINUTE: u32 = 55;

    /// Hour in which the window closes (midnight hour)
    pub const END_HOUR: u32 = 0;

    /// Last minute that still counts as inside the window
    pub const END_MINUTE: u32 = 1;

    /// Total length of the window, 23:55 to 00:01
    pub const LENGTH_MINUTES: i64 = 6;

    /// How long before the window the warning is shown
    pub const WARNING_LEAD_MINUTES: i64 = 15;
}

/// Auto-cleanup monitor timing
pub mod monitor {
    use super::Duration;

    /// Interval between monitor ticks
    pub const CHECK_INTERVAL: Duration = Duration::from_secs(10 * 60);

    /// Delay before the first check after start
    pub const INITIAL_DELAY: Duration = Duration::from_secs(5);

    /// Only the midnight hour is eligible for auto-cleanup
    pub const ELIGIBLE_HOUR: u32 = 0;

    /// Minutes after midnight before the monitor may run cleanup
    pub const GRACE_MINUTES: u32 = 5;
}

/// Warning presenter timing
pub mod warning {
    use super::Duration;

    /// Interval between warning re-evaluations
    pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

    /// Upper bound on clients remembered as having dismissed the warning
    pub const MAX_DISMISSED_CLIENTS: usize = 10_000;

    /// Longest accepted client id
    pub const MAX_CLIENT_ID_LEN: usize = 128;
}

/// Remote store names
pub mod store {
    /// Chat messages table
    pub const MESSAGES_TABLE: &str = "messages";

    /// Hack page messages table
    pub const HACK_MESSAGES_TABLE: &str = "hack_messages";

    /// Chat rooms, counted for the stats endpoint only
    pub const CHAT_ROOMS_TABLE: &str = "chat_rooms";

    /// Anonymous rooms, counted for the stats endpoint only
    pub const ANONYMOUS_ROOMS_TABLE: &str = "anonymous_rooms";

    /// Append-only log of cleanup runs
    pub const CLEANUP_LOG_TABLE: &str = "cleanup_log";

    /// Single-row maintenance status view
    pub const MAINTENANCE_STATUS_TABLE: &str = "maintenance_status";

    /// Procedure that clears both message tables and reports counts
    pub const TRIGGER_CLEANUP_PROCEDURE: &str = "trigger_manual_cleanup";

    /// Procedure that clears only the hack messages table
    pub const CLEAR_HACK_MESSAGES_PROCEDURE: &str = "clear_hack_messages";

    /// Optional housekeeping procedure run after a direct delete
    pub const DAILY_CLEANUP_PROCEDURE: &str = "daily_cleanup";

    /// Procedure that creates the cleanup log table when missing
    pub const ENSURE_CLEANUP_LOG_PROCEDURE: &str = "create_cleanup_log_table_if_not_exists";

    /// Procedure describing the server-side cleanup schedule
    pub const SCHEDULE_INFO_PROCEDURE: &str = "get_cleanup_schedule_info";

    /// Path prefix of the REST interface
    pub const REST_PATH: &str = "/rest/v1";
}

/// HTTP client timeout constants
pub mod http {
    use super::Duration;

    /// Default timeout for requests to the remote store
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for establishing connections to the remote store
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Default configuration values
pub mod defaults {
    /// Default bind address for the web API
    pub const HOST: &str = "0.0.0.0";

    /// Default port for the web API
    pub const PORT: u16 = 8095;

    /// Default config directory, overridable through `EXOCHAT_CONFIG_DIR`
    pub const CONFIG_DIR: &str = "config";
}
