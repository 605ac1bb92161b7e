//! # Status Command
//!
//! Implements the status command for checking configuration and API status.
//!
//! ## Usage
//!
//! ```bash
//! vibeguard status
//! ```

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;
use crate::config::{Config, config_path};
use crate::exit_codes::*;

/// Execute the status command
///
/// Checks configuration and API connectivity.
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Everything is configured and working
/// * `Ok(EXIT_CONFIG_ERROR)` - Configuration file is invalid
/// * `Ok(EXIT_NETWORK_ERROR)` - Cannot reach the API
/// * `Ok(EXIT_SERVER_ERROR)` - The API answered with an error status
pub async fn execute() -> Result<i32> {
    println!("{}", "VibeGuard CLI Status".bold());
    println!("{}", "─".repeat(40).dimmed());
    println!();

    let config = match Config::load() {
        Ok(config) => {
            let source = if Config::exists() {
                config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "found".to_string())
            } else {
                "defaults".to_string()
            };
            println!(
                "{} Configuration: {}",
                "✓".bright_green().bold(),
                source.green()
            );
            config
        }
        Err(e) => {
            println!("{} Configuration: {}", "✗".red().bold(), "Invalid".red());
            println!("  {} {}", "Error:".dimmed(), format!("{e:#}").dimmed());
            println!("  {} Run `vibeguard config reset` to start over", "→".cyan());
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let api_url = config.base_url();
    println!();
    println!("{} API Endpoint: {}", "ℹ".blue(), api_url.cyan());
    match config.masked_api_key() {
        Some(masked) => println!("{} API Key: {}", "ℹ".blue(), masked.dimmed()),
        None => println!("{} API Key: {}", "ℹ".blue(), "none (unauthenticated)".dimmed()),
    }

    let api_client = ApiClient::new(api_url).with_api_key(config.api_key());

    match api_client.health_check().await {
        Ok(true) => {
            println!(
                "{} API Status: {}",
                "✓".bright_green().bold(),
                "Healthy".green()
            );
            println!();
            println!(
                "{} Ready to scan. Run `vibeguard scan --code <CODE>` to start.",
                "✓".bright_green().bold()
            );
            Ok(EXIT_SUCCESS)
        }
        Ok(false) => {
            println!(
                "{} API Status: {}",
                "⚠".yellow().bold(),
                "Unhealthy".yellow()
            );
            println!("  {} The API returned a non-success status", "→".cyan());
            Ok(EXIT_SERVER_ERROR)
        }
        Err(e) => {
            println!("{} API Status: {}", "✗".red().bold(), "Unreachable".red());
            println!("  {} {}", "Error:".dimmed(), format!("{}", e).dimmed());
            println!();
            println!("{}", "Possible causes:".yellow());
            println!("  • The scanning service is not running");
            println!("  • VIBEGUARD_API_BASE or the stored base URL is wrong");
            Ok(EXIT_NETWORK_ERROR)
        }
    }
}
