//! Time source for everything that needs "now".
//!
//! Window logic works on naive local wall-clock fields, so a clock returns
//! an instant with its offset attached: `naive_local()` feeds the evaluator,
//! `to_rfc3339()` feeds result timestamps.

use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
#[cfg(any(test, feature = "testing"))]
use std::sync::RwLock;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Process local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Wall clock of a fixed IANA zone, independent of the host zone
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    zone: Tz,
}

impl ZonedClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.zone).fixed_offset()
    }
}

/// Manually driven clock for tests
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<RwLock<DateTime<FixedOffset>>>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            current: Arc::new(RwLock::new(start)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Pick the clock for an optional configured zone
pub fn clock_for(zone: Option<Tz>) -> Arc<dyn Clock> {
    match zone {
        Some(zone) => Arc::new(ZonedClock::new(zone)),
        None => Arc::new(SystemClock),
    }
}
