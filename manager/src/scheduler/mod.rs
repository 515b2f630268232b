//! Background jobs that delete chat data around midnight
//!
//! Two independent mechanisms exist:
//!
//! - **Auto-cleanup monitor**: a polling loop (every 10 minutes, first check
//!   5 seconds after start) that runs a cleanup once per calendar day during
//!   the 00:xx hour, after a grace period, unless the cleanup log already has
//!   an entry for today.
//! - **Daily cleanup job**: an optional cron job for deployments that want
//!   the server to run the cleanup at a fixed time regardless of the monitor.
//!
//! # Configuration
//!
//! ```toml
//! [monitor]
//! enabled = true
//! check_interval_seconds = 600
//! initial_delay_seconds = 5
//! grace_minutes = 5
//!
//! [cleanup]
//! daily_schedule = "0 2 0 * * *"  # 00:02:00 every day
//! ```
//!
//! Cron expressions use 6 fields (sec min hour day month dow).

pub mod auto_cleanup;
pub mod daily;
pub mod ticker;

pub use auto_cleanup::{AutoCleanupMonitor, MonitorSettings};
pub use daily::DailyCleanupJob;
pub use ticker::PeriodicTask;

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::debug;

use crate::services::CleanupResult;

/// Where the monitor is within a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Idle,
    Checking,
    Skipped,
    Running,
    Logged,
}

/// What a single check decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Outside the eligible hour or still inside the grace period
    NotDue,
    AlreadyRanToday { last_run: String },
    LogUnavailable { error: String },
    Cleaned { result: CleanupResult, logged: bool },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub state: MonitorState,
    pub running: bool,
    pub checks: u64,
    pub cleanups: u64,
    pub last_check: Option<String>,
    pub last_outcome: Option<CheckOutcome>,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            state: MonitorState::Idle,
            running: false,
            checks: 0,
            cleanups: 0,
            last_check: None,
            last_outcome: None,
        }
    }
}

/// Validate a 6-field cron expression (sec min hour day month dow)
pub fn validate_cron_schedule(schedule: &str) -> Result<()> {
    let parts: Vec<&str> = schedule.split_whitespace().collect();

    if parts.len() != 6 {
        return Err(anyhow!(
            "Expected 6 fields (second minute hour day month dayofweek), got {}: '{}'",
            parts.len(),
            schedule
        ));
    }

    validate_cron_field(parts[0], "second", 0, 59)?;
    validate_cron_field(parts[1], "minute", 0, 59)?;
    validate_cron_field(parts[2], "hour", 0, 23)?;
    validate_cron_field(parts[3], "day", 1, 31)?;
    validate_cron_field(parts[4], "month", 1, 12)?;
    validate_cron_field(parts[5], "dayofweek", 0, 7)?;

    debug!("Validated cron schedule '{}'", schedule);
    Ok(())
}

fn validate_cron_field(field: &str, name: &str, min: u32, max: u32) -> Result<()> {
    if field == "*" || field == "?" {
        return Ok(());
    }

    let in_range = |raw: &str, what: &str| -> Result<u32> {
        let value = raw
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid {} {}: {}", name, what, raw))?;
        if value < min || value > max {
            return Err(anyhow!(
                "{} value {} is outside valid range {}-{}",
                name,
                value,
                min,
                max
            ));
        }
        Ok(value)
    };

    if let Some(step) = field.strip_prefix("*/") {
        let step = step
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid {} step: {}", name, step))?;
        if step == 0 {
            return Err(anyhow!("{} step cannot be 0", name));
        }
        return Ok(());
    }

    if field.contains(',') {
        for part in field.split(',') {
            in_range(part, "list value")?;
        }
        return Ok(());
    }

    if let Some((start, end)) = field.split_once('-') {
        let start = in_range(start, "range start")?;
        let end = in_range(end, "range end")?;
        if start > end {
            return Err(anyhow!("{} range {}-{} is reversed", name, start, end));
        }
        return Ok(());
    }

    in_range(field, "value").map(|_| ())
}
