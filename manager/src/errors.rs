//! Custom error types for the maintenance manager
//!
//! Remote store failures and configuration failures are kept apart: the
//! first kind is recovered or converted into a failed cleanup result, the
//! second is fatal at startup.

use std::fmt;

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// Remote store error variants
#[derive(Debug, Clone)]
pub enum StoreError {
    /// The request never produced a response
    Transport { operation: String, reason: String },

    /// The store answered with a non-success status
    Remote {
        operation: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The relation or procedure does not exist
    NotFound { operation: String, relation: String },

    /// The response body could not be decoded
    Decode { operation: String, reason: String },
}

impl StoreError {
    /// True when the target table or procedure is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Transport { operation, reason } => {
                write!(f, "{} failed: {}", operation, reason)
            }
            StoreError::Remote {
                operation,
                status,
                code,
                message,
            } => match code {
                Some(code) => write!(
                    f,
                    "{} rejected with status {} ({}): {}",
                    operation, status, code, message
                ),
                None => write!(f, "{} rejected with status {}: {}", operation, status, message),
            },
            StoreError::NotFound {
                operation,
                relation,
            } => {
                write!(f, "{} failed: '{}' does not exist", operation, relation)
            }
            StoreError::Decode { operation, reason } => {
                write!(f, "{} returned an unreadable response: {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StoreError {}
