//! Service configuration.
//!
//! Loaded from an optional JSON file, then overridden from the environment,
//! then validated once at startup.

use crate::error::AppError;
use crate::models::sync_state::StateLabels;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file when no CLI argument is given.
pub const CONFIG_PATH_ENV: &str = "CONTENT_SYNC_CONFIG";

const REMOTE_URL_ENV: &str = "CONTENT_SYNC_REMOTE_URL";
const REMOTE_TOKEN_ENV: &str = "CONTENT_SYNC_REMOTE_TOKEN";
const DATABASE_ENV: &str = "CONTENT_SYNC_DATABASE";
const PORT_ENV: &str = "CONTENT_SYNC_PORT";

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

/// Remote sync service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the sync service API (e.g., `https://pulp.example.com/api`).
    pub base_url: String,

    /// Bearer token for authentication.
    pub token: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Limits for batches of remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanOutConfig {
    /// Maximum remote calls in flight per batch.
    pub max_concurrency: usize,

    /// Timeout applied to each remote call.
    pub call_timeout_secs: u64,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            call_timeout_secs: 20,
        }
    }
}

impl FanOutConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,

    /// Path to the SQLite catalog database.
    pub database_path: PathBuf,

    pub remote: RemoteConfig,

    pub fan_out: FanOutConfig,

    /// Optional `state -> label` overrides; must cover every state when set.
    pub state_labels: Option<BTreeMap<String, String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database_path: PathBuf::from("content-sync.db"),
            remote: RemoteConfig::default(),
            fan_out: FanOutConfig::default(),
            state_labels: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (if any) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => {
                log::info!("[config] Loading {}", path.display());
                Self::from_file(path)?
            }
            None => {
                log::info!("[config] No config file given, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(REMOTE_URL_ENV) {
            self.remote.base_url = url;
        }
        if let Some(token) = lookup(REMOTE_TOKEN_ENV) {
            self.remote.token = Some(token);
        }
        if let Some(db) = lookup(DATABASE_ENV) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .parse()
                .map_err(|_| AppError::config(format!("{} is not a port: {}", PORT_ENV, port)))?;
        }
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.remote.base_url.trim().is_empty() {
            return Err(AppError::config("remote.base_url is required"));
        }
        if self.fan_out.max_concurrency == 0 {
            return Err(AppError::config("fan_out.max_concurrency must be at least 1"));
        }
        if self.fan_out.call_timeout_secs == 0 {
            return Err(AppError::config("fan_out.call_timeout_secs must be at least 1"));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(AppError::config("database_path is required"));
        }
        self.labels()?;
        Ok(())
    }

    /// Resolve state labels, falling back to the built-in phrases.
    pub fn labels(&self) -> Result<StateLabels, AppError> {
        match &self.state_labels {
            Some(map) => StateLabels::from_map(map),
            None => Ok(StateLabels::default()),
        }
    }
}
