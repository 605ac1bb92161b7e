//! # Config Command
//!
//! Manages CLI configuration: the service base URL and the API key.
//!
//! ## Usage
//!
//! ```bash
//! # Show current configuration
//! vibeguard config show
//!
//! # Point at another deployment and set a key
//! vibeguard config set --base-url https://scanner.example.com --api-key vg_abc123
//!
//! # Remove the stored configuration
//! vibeguard config reset
//! ```

use anyhow::Result;
use colored::Colorize;

use crate::config::{API_KEY_ENV_VAR, BASE_URL_ENV_VAR, Config};
use crate::errors::{display_config_error, display_info, display_success};
use crate::exit_codes::*;

/// Arguments for the config show command
#[derive(Debug)]
pub struct ConfigShowArgs {
    /// Show full API key (default: masked)
    pub show_secrets: bool,
}

/// Arguments for the config set command
#[derive(Debug)]
pub struct ConfigSetArgs {
    pub base_url: Option<String>,
    /// An empty string clears the stored key
    pub api_key: Option<String>,
}

/// Execute the config show command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Configuration displayed successfully
/// * `Ok(EXIT_CONFIG_ERROR)` - Configuration file is invalid
pub fn execute_show(args: ConfigShowArgs) -> Result<i32> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            display_config_error(&format!("{e:#}"));
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    println!();
    println!("{}", "VibeGuard Configuration".bold().underline());
    println!();

    println!("{}", "Service".cyan().bold());
    println!("  {} {}", "Base URL:".dimmed(), config.base_url());
    if std::env::var(BASE_URL_ENV_VAR).is_ok() {
        println!("  {} {}", "Source:".dimmed(), BASE_URL_ENV_VAR);
    }

    let key = if args.show_secrets {
        config.api_key()
    } else {
        config.masked_api_key()
    };
    println!(
        "  {} {}",
        "API Key:".dimmed(),
        key.unwrap_or_else(|| "none".to_string())
    );
    if std::env::var(API_KEY_ENV_VAR).is_ok() {
        println!("  {} {}", "Source:".dimmed(), API_KEY_ENV_VAR);
    }
    println!();

    Ok(EXIT_SUCCESS)
}

/// Execute the config set command
pub fn execute_set(args: ConfigSetArgs) -> Result<i32> {
    if args.base_url.is_none() && args.api_key.is_none() {
        display_info("Nothing to change. Pass --base-url and/or --api-key.");
        return Ok(EXIT_SUCCESS);
    }

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            display_config_error(&format!("{e:#}"));
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    if let Some(base_url) = &args.base_url {
        config.set_base_url(base_url);
    }
    if let Some(api_key) = &args.api_key {
        config.set_api_key(api_key);
    }

    match config.save() {
        Ok(path) => {
            display_success(&format!("Configuration saved to {}", path.display()));
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            display_config_error(&format!("{e:#}"));
            Ok(EXIT_CONFIG_ERROR)
        }
    }
}

/// Execute the config reset command
pub fn execute_reset() -> Result<i32> {
    match Config::delete() {
        Ok(()) => {
            display_success("Configuration removed; defaults are in effect.");
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            display_config_error(&format!("{e:#}"));
            Ok(EXIT_CONFIG_ERROR)
        }
    }
}
