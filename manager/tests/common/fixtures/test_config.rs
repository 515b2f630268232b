//! Test configuration builder for creating config directories programmatically

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for a config directory with `main.toml` and `secrets.toml`
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_toml: Option<String>,
    secrets_toml: Option<String>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_toml: None,
            secrets_toml: None,
        }
    }

    /// Main config for a store at `url` with default everything else
    pub fn with_store_url(self, url: &str) -> Self {
        self.with_main_toml(&format!(
            r#"
port = 8099

[store]
url = "{}"
"#,
            url
        ))
    }

    pub fn with_main_toml(mut self, content: &str) -> Self {
        self.main_toml = Some(content.to_string());
        self
    }

    pub fn with_secrets(mut self, access_key: &str, cleanup_token: &str) -> Self {
        self.secrets_toml = Some(format!(
            r#"
[store]
access_key = "{}"

[cleanup]
token = "{}"
"#,
            access_key, cleanup_token
        ));
        self
    }

    /// Write the files and return the directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        if let Some(main) = &self.main_toml {
            fs::write(config_dir.join("main.toml"), main).expect("Failed to write main.toml");
        }
        if let Some(secrets) = &self.secrets_toml {
            fs::write(config_dir.join("secrets.toml"), secrets)
                .expect("Failed to write secrets.toml");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Built config directory, removed on drop
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn dir(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}
