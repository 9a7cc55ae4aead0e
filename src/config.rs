//! Configuration management for PokéGPT
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PokeGptError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for PokéGPT
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend service settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Navigable application URL settings
    #[serde(default)]
    pub app: AppConfig,
    /// Session lifecycle settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Favorites refresh settings
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

/// Backend HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Navigable URL settings
///
/// The active chat id is carried as a query parameter of this URL, so a
/// printed link is enough to resume a conversation later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base of the shareable chat link
    #[serde(default = "default_app_url")]
    pub base_url: String,
}

fn default_app_url() -> String {
    "http://localhost:5173/".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_app_url(),
        }
    }
}

/// Session lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay before an automatic creation retry (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Automatic creation retries before waiting for a manual retry
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between invalidating an unknown session and reloading (milliseconds)
    #[serde(default = "default_invalid_session_reload_ms")]
    pub invalid_session_reload_ms: u64,
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_invalid_session_reload_ms() -> u64 {
    3000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            max_retries: default_max_retries(),
            invalid_session_reload_ms: default_invalid_session_reload_ms(),
        }
    }
}

impl SessionConfig {
    /// Retry delay as a [`Duration`]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Reload delay as a [`Duration`]
    pub fn invalid_session_reload(&self) -> Duration {
        Duration::from_millis(self.invalid_session_reload_ms)
    }
}

/// Favorites refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesConfig {
    /// Background poll interval (seconds)
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Reply phrases that indicate a favorite was added or removed
    #[serde(default = "default_refresh_phrases")]
    pub refresh_phrases: Vec<String>,

    /// Tool names that add or remove favorites
    #[serde(default = "default_refresh_tools")]
    pub refresh_tools: Vec<String>,
}

fn default_poll_interval_seconds() -> u64 {
    30
}

fn default_refresh_phrases() -> Vec<String> {
    vec![
        "added to your favorites".to_string(),
        "removed from your favorites".to_string(),
        "to your favorites!".to_string(),
        "from your favorites!".to_string(),
    ]
}

fn default_refresh_tools() -> Vec<String> {
    vec![
        "add_to_favorites".to_string(),
        "remove_from_favorites".to_string(),
    ]
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            refresh_phrases: default_refresh_phrases(),
            refresh_tools: default_refresh_tools(),
        }
    }
}

impl FavoritesConfig {
    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PokeGptError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PokeGptError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("POKEGPT_API_URL") {
            self.backend.base_url = url;
        }

        if let Ok(url) = std::env::var("POKEGPT_APP_URL") {
            self.app.base_url = url;
        }

        if let Ok(timeout) = std::env::var("POKEGPT_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.backend.timeout_seconds = value,
                Err(_) => tracing::warn!("Ignoring invalid POKEGPT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(interval) = std::env::var("POKEGPT_FAVORITES_POLL_SECONDS") {
            match interval.parse() {
                Ok(value) => self.favorites.poll_interval_seconds = value,
                Err(_) => tracing::warn!(
                    "Ignoring invalid POKEGPT_FAVORITES_POLL_SECONDS: {}",
                    interval
                ),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.api_url {
            tracing::debug!("Backend URL overridden from CLI: {}", url);
            self.backend.base_url = url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.backend.base_url).map_err(|e| {
            PokeGptError::Config(format!(
                "backend.base_url is not a valid URL ({}): {}",
                self.backend.base_url, e
            ))
        })?;

        url::Url::parse(&self.app.base_url).map_err(|e| {
            PokeGptError::Config(format!(
                "app.base_url is not a valid URL ({}): {}",
                self.app.base_url, e
            ))
        })?;

        if self.backend.timeout_seconds == 0 {
            return Err(PokeGptError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.retry_delay_ms == 0 {
            return Err(PokeGptError::Config(
                "session.retry_delay_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.favorites.poll_interval_seconds == 0 {
            return Err(PokeGptError::Config(
                "favorites.poll_interval_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
