pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod scheduler;
pub mod services;
pub mod store;
pub mod warning;
pub mod web;
pub mod window;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigManager};
pub use scheduler::{AutoCleanupMonitor, DailyCleanupJob};
pub use services::{CleanupResult, CleanupService, MaintenanceService};
pub use store::{RemoteStore, RestStore};

#[cfg(any(test, feature = "testing"))]
pub use clock::ManualClock;
#[cfg(any(test, feature = "testing"))]
pub use store::MemoryStore;
pub use warning::{MaintenanceWarning, WarningState};
