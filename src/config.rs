//! # Configuration Management
//!
//! This module handles loading and saving CLI configuration: the scanning
//! service URL and an optional API key.
//!
//! ## Configuration File Location
//!
//! `$XDG_CONFIG_HOME/vibeguard/config.json`, falling back to
//! `$HOME/.config/vibeguard/config.json`.
//!
//! ## Environment Overrides
//!
//! - `VIBEGUARD_API_BASE` overrides the stored base URL
//! - `VIBEGUARD_API_KEY` overrides the stored API key

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable for overriding the base URL
pub const BASE_URL_ENV_VAR: &str = "VIBEGUARD_API_BASE";

/// Environment variable for overriding the API key
pub const API_KEY_ENV_VAR: &str = "VIBEGUARD_API_KEY";

/// CLI configuration
///
/// # Example
///
/// ```rust
/// use vibeguard::config::Config;
///
/// let config = Config::new_with_url(None, "http://scanner.internal:8000".to_string());
/// assert!(config.stored_api_key().is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key sent as `X-API-Key`; absent for unauthenticated deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    /// Base URL for the API (stored in config file)
    #[serde(default = "stored_default_base_url")]
    stored_base_url: String,
}

/// Default base URL for storage (without env var override)
fn stored_default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            stored_base_url: stored_default_base_url(),
        }
    }
}

impl Config {
    /// Create a configuration with a custom base URL
    pub fn new_with_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            api_key: non_blank(api_key),
            stored_base_url: base_url,
        }
    }

    /// Get the effective base URL
    ///
    /// Environment variable `VIBEGUARD_API_BASE` takes precedence over the config file.
    pub fn base_url(&self) -> String {
        std::env::var(BASE_URL_ENV_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.stored_base_url.clone())
    }

    /// Get the effective API key
    ///
    /// Environment variable `VIBEGUARD_API_KEY` takes precedence over the
    /// config file. An empty key means unauthenticated.
    pub fn api_key(&self) -> Option<String> {
        match std::env::var(API_KEY_ENV_VAR) {
            Ok(key) => non_blank(Some(key)),
            Err(_) => self.api_key.clone(),
        }
    }

    pub fn stored_base_url(&self) -> &str {
        &self.stored_base_url
    }

    pub fn stored_api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.stored_base_url = base_url.trim().trim_end_matches('/').to_string();
    }

    /// Store an API key. An empty key clears it.
    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = non_blank(Some(api_key.to_string()));
    }

    /// Get a masked version of the API key for display
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() > 8 {
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{head}...{tail}")
            } else {
                "****".to_string()
            }
        })
    }

    /// Load configuration from the default config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - The stored configuration, or defaults if none is stored
    /// * `Err(_)` - Configuration file unreadable or invalid
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default config file
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check if a configuration file exists
    pub fn exists() -> bool {
        config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Delete the configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Successfully deleted or file didn't exist
    /// * `Err(_)` - Failed to delete file
    pub fn delete() -> Result<()> {
        let path = config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get the path to the configuration file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs_config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("vibeguard").join("config.json"))
}

/// Get the config directory
///
/// `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
fn dirs_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .or_else(|| std::env::var("USERPROFILE").ok())
                .map(|h| PathBuf::from(h).join(".config"))
        })
}
