//! Dashboard configuration

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use mailroom_client::ClientConfig;

use crate::error::{DashboardError, Result};
use crate::projection::ViewOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Where the read API lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Page size for list requests
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Characters kept before subject/response text is cut with an ellipsis
    #[serde(default = "default_truncate_at")]
    pub truncate_at: usize,

    /// chrono format string for the received column
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP port for the dashboard API
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

// Defaults
fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_poll_interval() -> u64 { 5000 }
fn default_page_limit() -> u32 { 100 }
fn default_truncate_at() -> usize { 60 }
fn default_date_format() -> String { "%Y-%m-%d %H:%M:%S".to_string() }
fn default_http_port() -> u16 { 8080 }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            page_limit: default_page_limit(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            truncate_at: default_truncate_at(),
            date_format: default_date_format(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would busy-loop or produce unusable requests
    pub fn validate(&self) -> Result<()> {
        if self.sync.poll_interval_ms < 100 {
            return Err(DashboardError::Config(format!(
                "sync.poll_interval_ms must be at least 100, got {}",
                self.sync.poll_interval_ms
            )));
        }
        if !(1..=1000).contains(&self.sync.page_limit) {
            return Err(DashboardError::Config(format!(
                "sync.page_limit must be between 1 and 1000, got {}",
                self.sync.page_limit
            )));
        }
        if self.view.truncate_at == 0 {
            return Err(DashboardError::Config("view.truncate_at must be positive".into()));
        }
        if StrftimeItems::new(&self.view.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(DashboardError::Config(format!(
                "view.date_format is not a valid strftime string: {}",
                self.view.date_format
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync.poll_interval_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.backend.base_url.clone(),
            timeout_secs: self.backend.timeout_secs,
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            truncate_at: self.view.truncate_at,
            date_format: self.view.date_format.clone(),
        }
    }
}
