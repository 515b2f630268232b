// File: manager/src/scheduler/auto_cleanup.rs
use chrono::Timelike;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use super::{CheckOutcome, MonitorState, MonitorStatus, PeriodicTask};
use crate::clock::Clock;
use crate::config::MonitorConfig;
use crate::constants::monitor;
use crate::services::CleanupService;
use crate::store::{CleanupType, RemoteStore};

#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub check_interval: Duration,
    pub initial_delay: Duration,
    pub grace_minutes: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            check_interval: monitor::CHECK_INTERVAL,
            initial_delay: monitor::INITIAL_DELAY,
            grace_minutes: monitor::GRACE_MINUTES,
        }
    }
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            check_interval: Duration::from_secs(config.check_interval_seconds),
            initial_delay: Duration::from_secs(config.initial_delay_seconds),
            grace_minutes: config.grace_minutes,
        }
    }
}

/// Runs the cleanup at most once per calendar day, shortly after midnight.
///
/// The cleanup log in the remote store is the only record of earlier runs,
/// so several monitors sharing a store converge on one run per day as long
/// as their checks do not overlap.
#[derive(Clone)]
pub struct AutoCleanupMonitor {
    cleanup: Arc<CleanupService>,
    store: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
    settings: MonitorSettings,
    status: Arc<RwLock<MonitorStatus>>,
    task: Arc<PeriodicTask>,
}

impl AutoCleanupMonitor {
    pub fn new(
        cleanup: Arc<CleanupService>,
        store: Arc<dyn RemoteStore>,
        clock: Arc<dyn Clock>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            cleanup,
            store,
            clock,
            settings,
            status: Arc::new(RwLock::new(MonitorStatus::default())),
            task: Arc::new(PeriodicTask::new("auto-cleanup monitor")),
        }
    }

    /// Start polling. Calling again replaces the running loop.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        let monitor = self.clone();
        self.task
            .start(
                self.settings.initial_delay,
                self.settings.check_interval,
                move || {
                    let monitor = monitor.clone();
                    async move {
                        monitor.check_and_run().await;
                    }
                },
            )
            .await;

        info!(
            "Auto-cleanup monitor started: checking every {:?} after a {:?} delay",
            self.settings.check_interval, self.settings.initial_delay
        );
    }

    pub async fn stop(&self) {
        if self.task.stop().await {
            info!("Auto-cleanup monitor stopped");
        }
    }

    pub async fn status(&self) -> MonitorStatus {
        let mut status = self.status.read().await.clone();
        status.running = self.task.is_running().await;
        status
    }

    async fn set_state(&self, state: MonitorState) {
        self.status.write().await.state = state;
    }

    /// One check tick. Every failure is logged and folded into the
    /// returned outcome.
    #[instrument(skip(self))]
    pub async fn check_and_run(&self) -> CheckOutcome {
        self.set_state(MonitorState::Checking).await;

        let now = self.clock.now().naive_local();
        let outcome = self.evaluate(now).await;

        let state = match &outcome {
            CheckOutcome::AlreadyRanToday { .. } => MonitorState::Skipped,
            CheckOutcome::Cleaned { logged: true, .. } => MonitorState::Logged,
            _ => MonitorState::Idle,
        };

        let mut status = self.status.write().await;
        status.state = state;
        status.checks += 1;
        if matches!(outcome, CheckOutcome::Cleaned { .. }) {
            status.cleanups += 1;
        }
        status.last_check = Some(self.clock.now().to_rfc3339());
        status.last_outcome = Some(outcome.clone());

        outcome
    }

    async fn evaluate(&self, now: chrono::NaiveDateTime) -> CheckOutcome {
        if now.hour() != monitor::ELIGIBLE_HOUR || now.minute() < self.settings.grace_minutes {
            debug!("Not cleanup time ({:02}:{:02})", now.hour(), now.minute());
            return CheckOutcome::NotDue;
        }

        let latest = match self.store.latest_cleanup_log().await {
            Ok(latest) => latest,
            Err(e) if e.is_not_found() => {
                debug!("Cleanup log table not found, treating as empty");
                None
            }
            Err(e) => {
                error!("Error checking cleanup log: {}", e);
                return CheckOutcome::LogUnavailable {
                    error: e.to_string(),
                };
            }
        };

        let today = now.date();
        if let Some(entry) = latest.filter(|entry| entry.created_on() == Some(today)) {
            debug!("Cleanup already ran today at {}", entry.created_at);
            return CheckOutcome::AlreadyRanToday {
                last_run: entry.created_at,
            };
        }

        self.set_state(MonitorState::Running).await;
        info!("Running automatic cleanup for {}", today);

        let result = self.cleanup.trigger_cleanup().await;
        if !result.success {
            let error = result
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            warn!("Automatic cleanup failed: {}", error);
            return CheckOutcome::Failed { error };
        }

        info!(
            "Automatic cleanup completed: {} messages, {} hack messages",
            result.messages_deleted, result.hack_messages_deleted
        );

        let logged = self.cleanup.record(&result, CleanupType::Auto).await;
        CheckOutcome::Cleaned { result, logged }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::constants::store;
    use crate::errors::StoreError;
    use crate::store::{CleanupLogEntry, MemoryStore};
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn clock_at(day: u32, hour: u32, minute: u32) -> Arc<ManualClock> {
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, day, hour, minute, 0)
            .unwrap();
        Arc::new(ManualClock::new(start))
    }

    fn monitor(memory: &Arc<MemoryStore>, clock: Arc<ManualClock>) -> AutoCleanupMonitor {
        let cleanup = Arc::new(CleanupService::new(memory.clone(), clock.clone()));
        AutoCleanupMonitor::new(cleanup, memory.clone(), clock, MonitorSettings::default())
    }

    fn entry_on(day: u32, hour: u32, minute: u32) -> CleanupLogEntry {
        let at = NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        CleanupLogEntry::new(at, 1, 0, CleanupType::Auto)
    }

    #[tokio::test]
    async fn test_runs_once_when_log_is_empty() {
        let memory = Arc::new(MemoryStore::new().with_rows(store::MESSAGES_TABLE, 8));
        let monitor = monitor(&memory, clock_at(15, 0, 10));

        let outcome = monitor.check_and_run().await;

        assert!(matches!(outcome, CheckOutcome::Cleaned { logged: true, .. }));
        assert_eq!(
            memory.procedure_call_count(store::TRIGGER_CLEANUP_PROCEDURE).await,
            1
        );

        let entries = memory.log_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].cleanup_type, CleanupType::Auto);
        assert_eq!(entries[0].created_on(), NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(monitor.status().await.state, MonitorState::Logged);
    }

    #[tokio::test]
    async fn test_second_check_same_day_is_skipped() {
        let memory = Arc::new(MemoryStore::new());
        let clock = clock_at(15, 0, 10);
        let monitor = monitor(&memory, clock.clone());

        monitor.check_and_run().await;
        clock.advance(chrono::Duration::minutes(10));
        let outcome = monitor.check_and_run().await;

        assert!(matches!(outcome, CheckOutcome::AlreadyRanToday { .. }));
        assert_eq!(
            memory.procedure_call_count(store::TRIGGER_CLEANUP_PROCEDURE).await,
            1
        );
        assert_eq!(monitor.status().await.state, MonitorState::Skipped);
    }

    #[tokio::test]
    async fn test_entry_from_today_prevents_run() {
        let memory = Arc::new(MemoryStore::new().with_log_entry(entry_on(15, 0, 6)));
        let monitor = monitor(&memory, clock_at(15, 0, 20));

        let outcome = monitor.check_and_run().await;

        assert_eq!(
            outcome,
            CheckOutcome::AlreadyRanToday {
                last_run: "2025-06-15T00:06:00.000".to_string()
            }
        );
        assert!(memory.procedure_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_entry_from_yesterday_allows_run() {
        let memory = Arc::new(MemoryStore::new().with_log_entry(entry_on(14, 0, 6)));
        let monitor = monitor(&memory, clock_at(15, 0, 5));

        let outcome = monitor.check_and_run().await;

        assert!(matches!(outcome, CheckOutcome::Cleaned { .. }));
        assert_eq!(memory.log_entries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_outside_eligible_time_never_reads_log() {
        let memory = Arc::new(MemoryStore::new());

        for (hour, minute) in [(0, 3), (0, 4), (14, 0), (23, 59), (1, 0)] {
            let outcome = monitor(&memory, clock_at(15, hour, minute)).check_and_run().await;
            assert_eq!(outcome, CheckOutcome::NotDue);
        }

        assert_eq!(memory.log_reads().await, 0);
        assert!(memory.procedure_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_cleanup_writes_no_entry() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .fail_procedure(store::TRIGGER_CLEANUP_PROCEDURE, "statement timeout")
            .await;
        let monitor = monitor(&memory, clock_at(15, 0, 30));

        let outcome = monitor.check_and_run().await;

        assert_eq!(
            outcome,
            CheckOutcome::Failed {
                error: "rpc trigger_manual_cleanup failed: statement timeout".to_string()
            }
        );
        assert!(memory.log_entries().await.is_empty());
        assert!(memory.delete_calls().await.is_empty());
        assert_eq!(monitor.status().await.state, MonitorState::Idle);
    }

    #[tokio::test]
    async fn test_missing_log_table_counts_as_empty() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .fail_log_read(StoreError::NotFound {
                operation: "read cleanup_log".to_string(),
                relation: "cleanup_log".to_string(),
            })
            .await;

        let outcome = monitor(&memory, clock_at(15, 0, 10)).check_and_run().await;

        assert!(matches!(outcome, CheckOutcome::Cleaned { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_log_aborts_tick() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .fail_log_read(StoreError::Transport {
                operation: "read cleanup_log".to_string(),
                reason: "connection reset".to_string(),
            })
            .await;

        let outcome = monitor(&memory, clock_at(15, 0, 10)).check_and_run().await;

        assert!(matches!(outcome, CheckOutcome::LogUnavailable { .. }));
        assert!(memory.procedure_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_log_append_failure_still_counts_as_cleaned() {
        let memory = Arc::new(MemoryStore::new());
        memory.fail_log_append("read only").await;
        let monitor = monitor(&memory, clock_at(15, 0, 10));

        let outcome = monitor.check_and_run().await;

        assert!(matches!(outcome, CheckOutcome::Cleaned { logged: false, .. }));
        let status = monitor.status().await;
        assert_eq!(status.state, MonitorState::Idle);
        assert_eq!(status.cleanups, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_runs_a_single_loop() {
        let memory = Arc::new(MemoryStore::new());
        let monitor = monitor(&memory, clock_at(15, 0, 10));

        monitor.start().await;
        monitor.start().await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(memory.log_reads().await, 1);
        assert_eq!(memory.log_entries().await.len(), 1);
        assert!(monitor.status().await.running);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(memory.log_reads().await, 2);
        assert_eq!(memory.log_entries().await.len(), 1);

        monitor.stop().await;
        assert!(!monitor.status().await.running);
    }
}
