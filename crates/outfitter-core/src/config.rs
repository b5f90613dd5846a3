//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the backend base URL and the last email used to sign in.
//! Secrets never live here; tokens go to the OS keychain.
//!
//! Configuration is stored at `~/.config/outfitter/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "outfitter";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when neither the environment nor the config file names one
pub const DEFAULT_BACKEND: &str = "http://127.0.0.1:5000";

/// Environment variable overriding the configured backend
pub const BACKEND_ENV_VAR: &str = "OUTFITTER_BACKEND";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub backend: Option<String>,
    pub last_email: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Backend URL in priority order: explicit override, config file, default
    pub fn resolve_backend(&self, override_url: Option<String>) -> String {
        override_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.backend.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND.to_string())
    }

    /// Build the API client configuration, honouring `OUTFITTER_BACKEND`
    pub fn api_config(&self) -> Result<ApiConfig> {
        let backend = self.resolve_backend(std::env::var(BACKEND_ENV_VAR).ok());
        let mut api = ApiConfig::new(&backend)?;
        if let Some(secs) = self.request_timeout_secs {
            api = api.with_timeout(Duration::from_secs(secs));
        }
        Ok(api)
    }
}

/// Connection settings handed to `ApiClient::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Backend URL must use http or https: {}", base_url);
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute URL for an endpoint path such as `login`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
