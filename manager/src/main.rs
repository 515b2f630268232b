// File: manager/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use exochat_manager::clock::clock_for;
use exochat_manager::constants::defaults;
use exochat_manager::scheduler::DailyCleanupJob;
use exochat_manager::store::{RemoteStore, RestStore};
use exochat_manager::web::{start_web_server, AppState};
use exochat_manager::ConfigManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("exochat_manager=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting ExoChat maintenance manager");

    // Load configuration
    let config_dir =
        std::env::var("EXOCHAT_CONFIG_DIR").unwrap_or_else(|_| defaults::CONFIG_DIR.to_string());
    let config_manager = ConfigManager::new(config_dir).await?;
    let config = config_manager.get_current_config();

    let timezone = config.parsed_timezone()?;
    let clock = clock_for(timezone);
    match timezone {
        Some(zone) => info!("Maintenance window evaluated in {}", zone),
        None => info!("Maintenance window evaluated in the host time zone"),
    }

    let store: Arc<dyn RemoteStore> = Arc::new(RestStore::from_config(&config.store)?);
    info!("Remote store client initialized");

    let state = AppState::new(config.clone(), store, clock);

    if config.monitor.enabled {
        state.monitor.start().await;
    } else {
        warn!("Auto-cleanup monitor disabled in configuration");
    }

    state.warning.start().await;

    let daily_job = match &config.cleanup.daily_schedule {
        Some(schedule) => {
            let job =
                DailyCleanupJob::new(state.cleanup_service.clone(), schedule, timezone).await?;
            job.start().await?;
            Some(job)
        }
        None => {
            info!("No daily cleanup schedule configured");
            None
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    start_web_server(state.clone(), shutdown).await?;

    state.monitor.stop().await;
    state.warning.stop().await;
    if let Some(job) = daily_job {
        job.shutdown().await;
    }

    info!("Maintenance manager stopped");
    Ok(())
}
