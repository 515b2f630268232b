// File: manager/src/config/manager.rs
use super::{Config, SecretsLoader};
use crate::errors::ConfigError;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let mut config = Self::read_main_config(config_dir).await?;

        let secrets_path = Path::new(config_dir).join("secrets.toml");
        SecretsLoader::load(&secrets_path)?.apply(&mut config);

        config.apply_env_overrides(|name| std::env::var(name).ok());

        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

        info!(
            "Configuration loaded: store {}, monitor {} (every {}s), daily job {}",
            config.store.url.as_deref().unwrap_or("<unset>"),
            if config.monitor.enabled { "enabled" } else { "disabled" },
            config.monitor.check_interval_seconds,
            config.cleanup.daily_schedule.as_deref().unwrap_or("not scheduled"),
        );

        Ok(config)
    }

    async fn read_main_config(config_dir: &str) -> Result<Config, ConfigError> {
        let main_config_path = format!("{}/main.toml", config_dir);

        if !Path::new(&main_config_path).exists() {
            warn!(
                "Main config {} not found, using defaults and environment",
                main_config_path
            );
            return Ok(Config::default());
        }

        debug!("Loading main config: {}", main_config_path);

        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.clone(),
                    reason: e.to_string(),
                })?;

        toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
            reason: format!("{}: {}", main_config_path, e),
        })
    }
}
