//! # VibeGuard CLI Library
//!
//! This crate provides the client side of the VibeGuard scanning service:
//! it turns a code snippet or a directory tree into one request, submits it,
//! and keeps the displayed scan consistent with the service's scan history.
//!
//! ## Modules
//!
//! - [`archive`] - Flattening dropped or picked entries into a zip archive
//! - [`api`] - HTTP client and the [`api::ScanService`] seam
//! - [`session`] - Submission pipeline and session state
//! - [`models`] - Normalized scan results and history rows
//! - [`output`] - Terminal and JSON rendering
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration management
//! - [`errors`] - Error display
//! - [`exit_codes`] - Standard exit codes

pub mod api;
pub mod archive;
pub mod commands;
pub mod config;
pub mod errors;
pub mod exit_codes;
pub mod models;
pub mod output;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use session::{ScanRequest, SessionStore};
