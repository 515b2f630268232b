// File: manager/src/scheduler/ticker.rs
use std::future::Future;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

struct RunningLoop {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// A single background loop: one tick after `initial_delay`, then one every
/// `period`. Starting again replaces the running loop, so at most one loop
/// exists per ticker. Stopping never interrupts a tick in progress; the loop
/// exits at its next wait.
pub struct PeriodicTask {
    name: &'static str,
    running: Mutex<Option<RunningLoop>>,
}

impl PeriodicTask {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            running: Mutex::new(None),
        }
    }

    pub async fn start<F, Fut>(&self, initial_delay: Duration, period: Duration, tick: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut running = self.running.lock().await;

        if let Some(previous) = running.take() {
            info!("Restarting {} loop", self.name);
            let _ = previous.shutdown.send(true);
        }

        let (shutdown, mut stopped) = watch::channel(false);
        let name = self.name;

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = stopped.changed() => return,
                _ = time::sleep(initial_delay) => tick().await,
            }

            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = interval.tick() => tick().await,
                }
            }

            debug!("{} loop exited", name);
        });

        *running = Some(RunningLoop { shutdown, handle });
        debug!(
            "{} loop started: first tick in {:?}, then every {:?}",
            self.name, initial_delay, period
        );
    }

    /// Returns false when no loop was running
    pub async fn stop(&self) -> bool {
        match self.running.lock().await.take() {
            Some(running) => {
                let _ = running.shutdown.send(true);
                info!("Stopped {} loop", self.name);
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}
