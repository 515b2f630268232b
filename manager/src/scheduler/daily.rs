// File: manager/src/scheduler/daily.rs
use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::validate_cron_schedule;
use crate::services::{CleanupResult, CleanupService};
use crate::store::CleanupType;

/// Server-side daily cleanup on a cron schedule
pub struct DailyCleanupJob {
    cleanup: Arc<CleanupService>,
    schedule: String,
    timezone: Option<Tz>,
    scheduler: JobScheduler,
}

impl DailyCleanupJob {
    pub async fn new(
        cleanup: Arc<CleanupService>,
        schedule: &str,
        timezone: Option<Tz>,
    ) -> Result<Self> {
        validate_cron_schedule(schedule)
            .map_err(|e| anyhow!("Invalid daily cleanup schedule '{}': {}", schedule, e))?;

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            cleanup,
            schedule: schedule.to_string(),
            timezone,
            scheduler,
        })
    }

    pub fn schedule(&self) -> &str {
        &self.schedule
    }

    /// One scheduled run: full cleanup, then an `auto` log entry on success
    pub async fn run_once(&self) -> CleanupResult {
        run_scheduled_cleanup(&self.cleanup).await
    }

    #[instrument(skip(self), fields(schedule = %self.schedule))]
    pub async fn start(&self) -> Result<()> {
        let cleanup = self.cleanup.clone();

        let run = move |_uuid: Uuid,
                        _scheduler: JobScheduler|
              -> Pin<Box<dyn Future<Output = ()> + Send>> {
            let cleanup = cleanup.clone();
            Box::pin(async move {
                run_scheduled_cleanup(&cleanup).await;
            })
        };

        let job = match self.timezone {
            Some(zone) => Job::new_async_tz(self.schedule.as_str(), zone, run),
            None => Job::new_async_tz(self.schedule.as_str(), chrono::Local, run),
        }
        .map_err(|e| anyhow!("Failed to create daily cleanup job: {}", e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| anyhow!("Failed to add daily cleanup job: {}", e))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start daily cleanup scheduler: {}", e))?;

        info!("Daily cleanup scheduled: {}", self.schedule);
        Ok(())
    }

    pub async fn shutdown(&self) {
        let mut scheduler = self.scheduler.clone();
        if let Err(e) = scheduler.shutdown().await {
            warn!("Failed to shut down daily cleanup scheduler: {}", e);
        }
    }
}

async fn run_scheduled_cleanup(cleanup: &CleanupService) -> CleanupResult {
    info!("Executing scheduled daily cleanup");

    let result = cleanup.run_full_cleanup().await;
    if result.success {
        info!(
            "Scheduled cleanup removed {} messages and {} hack messages",
            result.messages_deleted, result.hack_messages_deleted
        );
        cleanup.record(&result, CleanupType::Auto).await;
    } else {
        error!(
            "Scheduled cleanup failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    result
}
