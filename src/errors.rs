//! # Error Handling
//!
//! User-friendly error display functions for the VibeGuard CLI.

use colored::Colorize;

use crate::archive::ArchiveError;
use crate::session::{PipelineError, ValidationError};

/// Display a network error with helpful suggestions
pub fn display_network_error(message: &str) {
    eprintln!("{} Network error: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!("{}", "Possible causes:".yellow());
    eprintln!("  • The scanning service is not running");
    eprintln!("  • The configured base URL is wrong");
    eprintln!("  • The service returned a response that could not be read");
    eprintln!();
    eprintln!(
        "{} Run `vibeguard status` to check connectivity.",
        "Tip:".cyan().bold()
    );
}

/// Display an error reported by the scanning service
///
/// # Arguments
///
/// * `status` - HTTP status code
/// * `message` - Message extracted from the response body
pub fn display_server_error(status: u16, message: &str) {
    eprintln!(
        "{} Server error ({}): {}",
        "✗".red().bold(),
        status,
        message
    );
    eprintln!();
    match status {
        401 | 403 => {
            eprintln!("{}", "Possible causes:".yellow());
            eprintln!("  • The API key is missing or invalid");
            eprintln!();
            eprintln!(
                "{} Run `vibeguard config set --api-key <KEY>` or set VIBEGUARD_API_KEY.",
                "Tip:".cyan().bold()
            );
        }
        404 => {
            eprintln!(
                "{} Run `vibeguard history` to list existing scans.",
                "Tip:".cyan().bold()
            );
        }
        400 | 413 | 422 => {
            eprintln!(
                "{} The service rejected the input. Check the file types and size.",
                "Tip:".cyan().bold()
            );
        }
        _ => {
            eprintln!("{}", "Possible causes:".yellow());
            eprintln!("  • The analysis failed on the server");
            eprintln!("  • The service is temporarily unavailable");
            eprintln!();
            eprintln!("{} Try again in a moment.", "Tip:".cyan().bold());
        }
    }
}

/// Display a configuration error with helpful suggestions
pub fn display_config_error(message: &str) {
    eprintln!("{} Configuration error: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!("{}", "Possible causes:".yellow());
    eprintln!("  • Configuration file is corrupted");
    eprintln!("  • The config directory is not writable");
    eprintln!();
    eprintln!(
        "{} Run `vibeguard config reset` to start over.",
        "Tip:".cyan().bold()
    );
}

/// Display a validation error with helpful suggestions
pub fn display_validation_error(message: &str) {
    eprintln!("{} Invalid input: {}", "✗".red().bold(), message);
    eprintln!();
    eprintln!(
        "{} Pass code with --code or --code-file, or paths to scan.",
        "Tip:".cyan().bold()
    );
}

/// Display an archive building or packaging error
pub fn display_archive_error(err: &ArchiveError) {
    eprintln!("{} Archive error: {}", "✗".red().bold(), err);
    let tip = match err {
        ArchiveError::DuplicatePath { .. } => {
            Some("Two inputs map to the same path. Rename one or pass their parent directory.")
        }
        ArchiveError::ReadFailure { .. } => Some("Check that the file exists and is readable."),
        ArchiveError::InvalidPath { .. } => {
            Some("Relative paths must not be empty or contain `..` components.")
        }
        ArchiveError::BuilderBusy | ArchiveError::Packaging { .. } => None,
    };
    if let Some(tip) = tip {
        eprintln!();
        eprintln!("{} {}", "Tip:".cyan().bold(), tip);
    }
}

/// Display any pipeline error with the matching hints
pub fn display_pipeline_error(err: &PipelineError) {
    match err {
        PipelineError::Validation(e @ ValidationError::InvalidScanId { .. }) => {
            display_error(&e.to_string());
            eprintln!();
            eprintln!(
                "{} Run `vibeguard history` to list scan ids.",
                "Tip:".cyan().bold()
            );
        }
        PipelineError::Validation(e) => display_validation_error(&e.to_string()),
        PipelineError::Archive(e) => display_archive_error(e),
        PipelineError::Network { message } => display_network_error(message),
        PipelineError::Server { status, message } => display_server_error(*status, message),
    }
}

/// Display a generic error
pub fn display_error(message: &str) {
    eprintln!("{} Error: {}", "✗".red().bold(), message);
}

/// Display a warning
pub fn display_warning(message: &str) {
    eprintln!("{} Warning: {}", "⚠".yellow().bold(), message);
}

/// Display a success message
pub fn display_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Display an info message
pub fn display_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
