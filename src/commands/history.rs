//! # History Command
//!
//! Lists the most recent scans stored by the service.
//!
//! ## Usage
//!
//! ```bash
//! vibeguard history
//! vibeguard history --limit 50 --json
//! ```

use anyhow::Result;
use chrono::Utc;

use crate::exit_codes::*;
use crate::output::{render_history, render_json};

use super::{open_store, report};

/// Arguments for the history command
#[derive(Debug)]
pub struct HistoryArgs {
    pub limit: usize,
    pub json: bool,
}

/// Execute the history command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - History listed
/// * `Ok(EXIT_CONFIG_ERROR)` - Configuration error
/// * `Ok(EXIT_NETWORK_ERROR)` / `Ok(EXIT_SERVER_ERROR)` - The service call failed
pub async fn execute(args: HistoryArgs) -> Result<i32> {
    let Some(store) = open_store() else {
        return Ok(EXIT_CONFIG_ERROR);
    };
    let store = store.with_history_limit(args.limit);

    if let Err(e) = store.refresh_history().await {
        return Ok(report(&e));
    }

    let state = store.snapshot();
    if args.json {
        render_json(state.history())?;
    } else {
        render_history(state.history(), state.active_id(), Utc::now());
    }
    Ok(EXIT_SUCCESS)
}
