//! Project configuration file support for granteval.
//!
//! Loads configuration from `granteval.toml` in the working directory. The API
//! credential is never read from this file; it comes from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use granteval_core::EnvSettings;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "granteval.toml";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4000;

/// Project-level configuration loaded from `granteval.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Backend model identifier
    pub model: Option<String>,
    /// Base URL of the generative API
    pub base_url: Option<String>,
    /// Request timeout for backend calls, in seconds
    pub timeout_secs: Option<u64>,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Backend settings source.
    /// Model priority: CLI flag > config file > `GEMINI_MODEL` > default
    pub fn env_settings(&self, cli_model: Option<&str>) -> EnvSettings {
        let mut settings = EnvSettings::default();
        if let Some(model) = cli_model.or(self.model.as_deref()) {
            settings = settings.with_model(model);
        }
        if let Some(ref base_url) = self.base_url {
            settings = settings.with_base_url(base_url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        settings
    }

    /// Priority: CLI flag > config file > default
    pub fn host(&self, cli_host: Option<&str>) -> String {
        cli_host
            .or(self.server.host.as_deref())
            .unwrap_or(DEFAULT_HOST)
            .to_string()
    }

    /// Priority: CLI flag > config file > default
    pub fn port(&self, cli_port: Option<u16>) -> u16 {
        cli_port.or(self.server.port).unwrap_or(DEFAULT_PORT)
    }
}
