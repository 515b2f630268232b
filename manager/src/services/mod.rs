// File: manager/src/services/mod.rs

pub mod cleanup_service;
pub mod maintenance_service;

pub use cleanup_service::{CleanupResult, CleanupService};
pub use maintenance_service::{
    MaintenanceService, MaintenanceSnapshot, MaintenanceStatus, StatusSource, TableCounts,
};
