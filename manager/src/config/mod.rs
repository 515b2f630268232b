// File: manager/src/config/mod.rs
pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, http, monitor, warning, window};
use crate::errors::ConfigError;

pub use manager::ConfigManager;
pub use secrets::SecretsLoader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// IANA zone used for the wall clock; the process local zone when unset
    pub timezone: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub warning: WarningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    #[serde(default, skip_serializing)]
    pub access_key: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupConfig {
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// 6-field cron expression for the server-side daily cleanup job
    pub daily_schedule: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_seconds: u64,
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningConfig {
    #[serde(default = "default_warning_poll")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_request_timeout() -> u64 {
    http::REQUEST_TIMEOUT.as_secs()
}

fn default_true() -> bool {
    true
}

fn default_check_interval() -> u64 {
    monitor::CHECK_INTERVAL.as_secs()
}

fn default_initial_delay() -> u64 {
    monitor::INITIAL_DELAY.as_secs()
}

fn default_grace_minutes() -> u32 {
    monitor::GRACE_MINUTES
}

fn default_warning_poll() -> u64 {
    warning::POLL_INTERVAL.as_secs()
}

fn default_lead_minutes() -> i64 {
    window::WARNING_LEAD_MINUTES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timezone: None,
            store: StoreConfig::default(),
            cleanup: CleanupConfig::default(),
            monitor: MonitorConfig::default(),
            warning: WarningConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            access_key: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_seconds: default_check_interval(),
            initial_delay_seconds: default_initial_delay(),
            grace_minutes: default_grace_minutes(),
        }
    }
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_warning_poll(),
            lead_minutes: default_lead_minutes(),
        }
    }
}

impl Config {
    /// Apply environment overrides. The first variable found in each group wins.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(url) = first(&["SUPABASE_URL", "VITE_SUPABASE_URL"]) {
            self.store.url = Some(url);
        }
        if let Some(key) = first(&["SUPABASE_SERVICE_ROLE_KEY", "VITE_SUPABASE_ANON_KEY"]) {
            self.store.access_key = Some(key);
        }
        if let Some(token) = first(&["CLEANUP_TOKEN"]) {
            self.cleanup.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self
            .store
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "store.url".to_string(),
            })?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "store.url".to_string(),
                reason: format!("'{}' is not an http(s) URL", url),
            });
        }

        if self
            .store
            .access_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::MissingRequired {
                field: "store.access_key".to_string(),
            });
        }

        if self
            .cleanup
            .token
            .as_deref()
            .map_or(true, |t| t.trim().is_empty())
        {
            return Err(ConfigError::MissingRequired {
                field: "cleanup.token".to_string(),
            });
        }

        if self.store.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.request_timeout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.monitor.check_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.check_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.monitor.grace_minutes > 59 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.grace_minutes".to_string(),
                reason: format!("{} is outside 0-59", self.monitor.grace_minutes),
            });
        }

        if self.warning.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "warning.poll_interval_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.warning.lead_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "warning.lead_minutes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        self.parsed_timezone()?;

        Ok(())
    }

    pub fn parsed_timezone(&self) -> Result<Option<chrono_tz::Tz>, ConfigError> {
        match &self.timezone {
            None => Ok(None),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    field: "timezone".to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}
