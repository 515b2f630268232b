//! HTTP request handlers for the maintenance API.
//!
//! - `cleanup` - Token-protected cleanup entry points and cleanup status
//! - `common` - Response envelope shared by the status routes
//! - `maintenance` - Window, status and warning endpoints

pub mod cleanup;
pub mod common;
pub mod maintenance;

pub use cleanup::*;
pub use maintenance::*;
