//! Application configuration management.
//!
//! Holds the API root, the last used login, network and banner timings, the
//! token storage backend and an optional log directory.
//!
//! Configuration is stored at `~/.config/budgetdesk/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "budgetdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured API root
pub const API_ROOT_ENV: &str = "BUDGETDESK_API_ROOT";

const DEFAULT_API_ROOT: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Transient banners disappear after this many seconds.
const DEFAULT_BANNER_SECONDS: u64 = 3;

/// Where the session credential is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_root: String,
    pub last_login: Option<String>,
    pub request_timeout_secs: u64,
    pub banner_seconds: u64,
    pub token_backend: TokenBackend,
    pub log_dir: Option<PathBuf>,
    /// API root taken from the environment; never written back to disk.
    #[serde(skip)]
    api_root_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            last_login: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            banner_seconds: DEFAULT_BANNER_SECONDS,
            token_backend: TokenBackend::default(),
            log_dir: None,
            api_root_override: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.override_api_root(std::env::var(API_ROOT_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Use `root` for this run only. Blank values are ignored.
    pub fn override_api_root(&mut self, root: Option<String>) {
        self.api_root_override = root
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
    }

    /// Effective API root: the environment override if any, else the stored one.
    pub fn api_root(&self) -> &str {
        self.api_root_override.as_deref().unwrap_or(&self.api_root)
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

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn banner_duration(&self) -> Duration {
        Duration::from_secs(self.banner_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_root": "https://budget.example/api"}"#).unwrap();
        assert_eq!(config.api_root, "https://budget.example/api");
        assert_eq!(config.banner_seconds, 3);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.token_backend, TokenBackend::File);
    }

    #[test]
    fn test_token_backend_lowercase() {
        let config: Config = serde_json::from_str(r#"{"token_backend": "keyring"}"#).unwrap();
        assert_eq!(config.token_backend, TokenBackend::Keyring);
    }

    #[test]
    fn test_api_root_override_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budgetdesk").join(CONFIG_FILE);
        let mut config = Config {
            api_root: "https://budget.example/api".to_string(),
            ..Config::default()
        };
        config.override_api_root(Some(" http://staging.local/api ".to_string()));
        config.last_login = Some("mdupont".to_string());
        assert_eq!(config.api_root(), "http://staging.local/api");

        config.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.api_root(), "https://budget.example/api");
        assert_eq!(reloaded.last_login.as_deref(), Some("mdupont"));
    }

    #[test]
    fn test_blank_override_keeps_stored_root() {
        let mut config = Config::default();
        config.override_api_root(Some("   ".to_string()));
        assert_eq!(config.api_root(), DEFAULT_API_ROOT);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.api_root(), DEFAULT_API_ROOT);
        assert!(config.last_login.is_none());
    }

    #[test]
    fn test_banner_duration() {
        let config = Config::default();
        assert_eq!(config.banner_duration(), Duration::from_secs(3));
    }
}
