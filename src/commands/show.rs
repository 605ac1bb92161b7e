//! # Show Command
//!
//! Fetches a stored scan and renders it.
//!
//! ## Usage
//!
//! ```bash
//! vibeguard show 3f9c2a
//! vibeguard show 3f9c2a --output json
//! ```

use anyhow::Result;

use crate::errors::display_error;
use crate::exit_codes::*;
use crate::models::ScanId;
use crate::output::{OutputFormat, render_json, render_result};
use crate::session::Resolution;

use super::{open_store, report};

/// Arguments for the show command
#[derive(Debug)]
pub struct ShowArgs {
    pub id: String,
    pub output: OutputFormat,
}

/// Execute the show command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Scan displayed
/// * `Ok(EXIT_CONFIG_ERROR)` - Configuration error
/// * `Ok(EXIT_INVALID_INPUT)` - The id is blank or not a valid path segment
/// * `Ok(EXIT_SERVER_ERROR)` - The scan does not exist or the service failed
/// * `Ok(EXIT_NETWORK_ERROR)` - The service is unreachable
pub async fn execute(args: ShowArgs) -> Result<i32> {
    let Some(store) = open_store() else {
        return Ok(EXIT_CONFIG_ERROR);
    };

    let id = ScanId::new(args.id.trim());
    match store.select_existing(&id).await {
        Ok(Resolution::Applied(result)) => {
            match args.output {
                OutputFormat::Json => render_json(&result)?,
                OutputFormat::Text => render_result(&result),
            }
            Ok(EXIT_SUCCESS)
        }
        Ok(Resolution::Stale) => {
            display_error(&format!("Scan {id} was superseded before it loaded"));
            Ok(EXIT_ERROR)
        }
        Err(e) => Ok(report(&e)),
    }
}
