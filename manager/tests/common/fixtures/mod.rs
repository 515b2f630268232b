//! This module provides reusable test utilities:
//! - Mock remote store server (PostgREST endpoints)
//! - Test configuration builders
//! - Clocks and log entries at fixed wall-clock times

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_store;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_store::MockStoreServer;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
