//! Daily maintenance window evaluation.
//!
//! The window runs from 23:55 to 00:01 local wall-clock time and wraps
//! midnight. Every function here is pure: the caller supplies "now" as a
//! naive local timestamp, and no timezone or DST adjustment is applied.

use chrono::{Days, Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::constants::window;

const WINDOW_START: NaiveTime =
    match NaiveTime::from_hms_opt(window::START_HOUR, window::START_MINUTE, 0) {
        Some(time) => time,
        None => panic!("window start is not a valid time"),
    };

const WINDOW_END: NaiveTime = match NaiveTime::from_hms_opt(window::END_HOUR, window::END_MINUTE, 0)
{
    Some(time) => time,
    None => panic!("window end is not a valid time"),
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceInfo {
    pub is_maintenance_time: bool,
    #[serde(rename = "time_until_maintenance_ms", serialize_with = "as_millis")]
    pub time_until_maintenance: Duration,
    #[serde(rename = "time_until_end_ms", serialize_with = "as_millis")]
    pub time_until_end: Duration,
    pub next_maintenance_start: NaiveDateTime,
    pub current_maintenance_end: Option<NaiveDateTime>,
}

/// Countdown shown on the maintenance screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceCountdown {
    /// Remaining time as `m:ss`
    pub remaining: String,
    pub progress_percent: f64,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_milliseconds())
}

/// True from 23:55 through 23:59 and from 00:00 through 00:01 (minute granularity)
pub fn is_in_maintenance_window(now: NaiveDateTime) -> bool {
    let hour = now.hour();
    let minute = now.minute();

    if hour == window::START_HOUR && minute >= window::START_MINUTE {
        return true;
    }

    hour == window::END_HOUR && minute <= window::END_MINUTE
}

pub fn get_maintenance_info(now: NaiveDateTime) -> MaintenanceInfo {
    let hour = now.hour();
    let minute = now.minute();
    let today = now.date();
    let tomorrow = today + Days::new(1);

    let is_maintenance_time = is_in_maintenance_window(now);

    let next_maintenance_start =
        if hour < window::START_HOUR || (hour == window::START_HOUR && minute < window::START_MINUTE) {
            today.and_time(WINDOW_START)
        } else {
            tomorrow.and_time(WINDOW_START)
        };

    let current_maintenance_end = is_maintenance_time.then(|| {
        if hour == window::START_HOUR {
            tomorrow.and_time(WINDOW_END)
        } else {
            today.and_time(WINDOW_END)
        }
    });

    let time_until_end = current_maintenance_end
        .map(|end| end - now)
        .unwrap_or_else(Duration::zero);

    MaintenanceInfo {
        is_maintenance_time,
        time_until_maintenance: next_maintenance_start - now,
        time_until_end,
        next_maintenance_start,
        current_maintenance_end,
    }
}

/// Render as `1h 1m 1s`, `1m 30s` or `5s`. Sub-second parts are dropped.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_milliseconds().max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

pub fn should_show_maintenance_warning(now: NaiveDateTime, lead: Duration) -> bool {
    let info = get_maintenance_info(now);

    !info.is_maintenance_time
        && info.time_until_maintenance <= lead
        && info.time_until_maintenance > Duration::zero()
}

pub fn maintenance_warning_message(now: NaiveDateTime) -> String {
    let info = get_maintenance_info(now);
    format!(
        "Maintenance starts in {}. All chats will be cleared at midnight.",
        format_duration(info.time_until_maintenance)
    )
}

/// Remaining time and progress through the window, `None` outside it
pub fn maintenance_countdown(now: NaiveDateTime) -> Option<MaintenanceCountdown> {
    let end = get_maintenance_info(now).current_maintenance_end?;
    let remaining = end - now;

    if remaining <= Duration::zero() {
        return None;
    }

    let remaining_ms = remaining.num_milliseconds();
    let minutes = remaining_ms / 60_000;
    let seconds = (remaining_ms % 60_000) / 1000;

    let total_ms = Duration::minutes(window::LENGTH_MINUTES).num_milliseconds() as f64;
    let elapsed_ms = total_ms - remaining_ms as f64;
    let progress_percent = (elapsed_ms / total_ms * 100.0).clamp(0.0, 100.0);

    Some(MaintenanceCountdown {
        remaining: format!("{}:{:02}", minutes, seconds),
        progress_percent,
    })
}
