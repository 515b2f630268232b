// File: manager/src/config/secrets.rs
//! Secrets loader for the store access key and the cleanup bearer token.
//!
//! Secrets are stored in a separate TOML file (config/secrets.toml) that should
//! be excluded from version control. Values found here override main.toml and
//! are in turn overridden by environment variables.
//!
//! Example secrets.toml:
//! ```toml
//! [store]
//! access_key = "service-role-key"
//!
//! [cleanup]
//! token = "cleanup-bearer-token"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::Config;

#[derive(Debug, Deserialize, Default)]
pub struct SecretsFile {
    #[serde(default)]
    pub store: StoreSecrets,
    #[serde(default)]
    pub cleanup: CleanupSecrets,
}

#[derive(Debug, Deserialize, Default)]
pub struct StoreSecrets {
    pub access_key: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CleanupSecrets {
    pub token: Option<String>,
}

/// Loader for secrets from the secrets.toml file
pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, expecting secrets from the environment",
                secrets_path
            );
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!("Loaded secrets from {:?}", secrets_path);

        Ok(Self { secrets })
    }

    pub fn store_access_key(&self) -> Option<&str> {
        self.secrets.store.access_key.as_deref()
    }

    pub fn cleanup_token(&self) -> Option<&str> {
        self.secrets.cleanup.token.as_deref()
    }

    /// Copy every secret present in the file onto the config
    pub fn apply(&self, config: &mut Config) {
        if let Some(key) = self.store_access_key() {
            config.store.access_key = Some(key.to_string());
        }
        if let Some(token) = self.cleanup_token() {
            config.cleanup.token = Some(token.to_string());
        }
    }
}
