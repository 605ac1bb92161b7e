//! # CLI Command Implementations
//!
//! This module contains the implementation of all CLI commands.
//! Each submodule represents a top-level command or command group.
//!
//! ## Available Commands
//!
//! - [`scan`] - Scan a snippet, dropped paths, or a picked file list
//! - [`history`] - List recent scans
//! - [`show`] - Display a stored scan
//! - [`delete`] - Delete a stored scan
//! - [`status`] - Check configuration and service connectivity
//! - [`config`] - Manage CLI configuration

pub mod config;
pub mod delete;
pub mod history;
pub mod scan;
pub mod show;
pub mod status;

use crate::api::ApiClient;
use crate::config::Config;
use crate::errors::{display_config_error, display_pipeline_error};
use crate::exit_codes::for_error_kind;
use crate::session::{PipelineError, SessionStore};

/// Load configuration and build a session store against the configured service.
///
/// Prints the error and returns `None` when the configuration is unreadable.
pub(crate) fn open_store() -> Option<SessionStore<ApiClient>> {
    match Config::load() {
        Ok(config) => {
            let client = ApiClient::new(config.base_url()).with_api_key(config.api_key());
            log::debug!(
                "Using {} (trace id {})",
                client.base_url,
                client.trace_id()
            );
            Some(SessionStore::new(client))
        }
        Err(e) => {
            display_config_error(&format!("{e:#}"));
            None
        }
    }
}

/// Print a pipeline failure and return its exit code.
pub(crate) fn report(err: &PipelineError) -> i32 {
    display_pipeline_error(err);
    for_error_kind(err.kind())
}
