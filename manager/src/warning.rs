//! Pre-maintenance warning state shown to chat clients.
//!
//! The presenter polls the window evaluator (immediately, then every 30
//! seconds) and keeps one shared [`WarningState`]. Dismissal belongs to a
//! single client: each client id that dismisses is remembered until a poll
//! finds the warning no longer due, so the next evening's warning shows
//! again and other clients are never affected.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::constants::warning::{MAX_CLIENT_ID_LEN, MAX_DISMISSED_CLIENTS};
use crate::scheduler::PeriodicTask;
use crate::window;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningState {
    pub show_warning: bool,
    pub message: Option<String>,
    pub in_maintenance: bool,
    /// Whether the requesting client has dismissed the current warning
    pub dismissed: bool,
    pub last_checked: Option<String>,
}

impl WarningState {
    fn dismissed_view(mut self) -> Self {
        self.dismissed = true;
        self.show_warning = false;
        self.message = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissError {
    InvalidClientId,
}

impl std::fmt::Display for DismissError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DismissError::InvalidClientId => write!(
                f,
                "client_id must be 1-{} characters of [A-Za-z0-9_-]",
                MAX_CLIENT_ID_LEN
            ),
        }
    }
}

impl std::error::Error for DismissError {}

#[derive(Default)]
struct Inner {
    polled: WarningState,
    dismissed_by: HashSet<String>,
}

#[derive(Clone)]
pub struct MaintenanceWarning {
    clock: Arc<dyn Clock>,
    lead: chrono::Duration,
    poll_interval: Duration,
    inner: Arc<RwLock<Inner>>,
    task: Arc<PeriodicTask>,
}

fn valid_client_id(client_id: &str) -> bool {
    !client_id.is_empty()
        && client_id.len() <= MAX_CLIENT_ID_LEN
        && client_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl MaintenanceWarning {
    pub fn new(clock: Arc<dyn Clock>, lead: chrono::Duration, poll_interval: Duration) -> Self {
        Self {
            clock,
            lead,
            poll_interval,
            inner: Arc::new(RwLock::new(Inner::default())),
            task: Arc::new(PeriodicTask::new("maintenance warning")),
        }
    }

    /// Re-evaluate against the clock and return the shared state
    pub async fn refresh(&self) -> WarningState {
        let now = self.clock.now();
        let wall = now.naive_local();
        let due = window::should_show_maintenance_warning(wall, self.lead);
        let in_maintenance = window::is_in_maintenance_window(wall);

        let mut inner = self.inner.write().await;

        if !due && !inner.dismissed_by.is_empty() {
            debug!(
                "Clearing {} warning dismissals",
                inner.dismissed_by.len()
            );
            inner.dismissed_by.clear();
        }

        if due != inner.polled.show_warning {
            if due {
                info!("Showing maintenance warning");
            } else {
                debug!("Maintenance warning cleared");
            }
        }

        if in_maintenance != inner.polled.in_maintenance {
            if in_maintenance {
                info!("Maintenance window started");
            } else {
                info!("Maintenance window ended");
            }
        }

        inner.polled = WarningState {
            show_warning: due,
            message: due.then(|| window::maintenance_warning_message(wall)),
            in_maintenance,
            dismissed: false,
            last_checked: Some(now.to_rfc3339()),
        };

        inner.polled.clone()
    }

    /// Hide the warning for one client until the lead period ends
    pub async fn dismiss(&self, client_id: &str) -> Result<WarningState, DismissError> {
        if !valid_client_id(client_id) {
            return Err(DismissError::InvalidClientId);
        }

        let mut inner = self.inner.write().await;

        if inner.dismissed_by.contains(client_id) {
            return Ok(inner.polled.clone().dismissed_view());
        }

        if inner.dismissed_by.len() >= MAX_DISMISSED_CLIENTS {
            warn!(
                "Ignoring warning dismissal for {}: {} clients already recorded",
                client_id, MAX_DISMISSED_CLIENTS
            );
            return Ok(inner.polled.clone());
        }

        inner.dismissed_by.insert(client_id.to_string());
        debug!("Maintenance warning dismissed by {}", client_id);
        Ok(inner.polled.clone().dismissed_view())
    }

    /// Last polled state, without any dismissal applied
    pub async fn current(&self) -> WarningState {
        self.inner.read().await.polled.clone()
    }

    /// Last polled state as seen by one client
    pub async fn current_for(&self, client_id: &str) -> WarningState {
        let inner = self.inner.read().await;
        if inner.dismissed_by.contains(client_id) {
            inner.polled.clone().dismissed_view()
        } else {
            inner.polled.clone()
        }
    }

    pub async fn start(&self) {
        let warning = self.clone();
        self.task
            .start(Duration::ZERO, self.poll_interval, move || {
                let warning = warning.clone();
                async move {
                    warning.refresh().await;
                }
            })
            .await;
    }

    pub async fn stop(&self) {
        self.task.stop().await;
    }
}
