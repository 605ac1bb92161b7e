//! # Delete Command
//!
//! Deletes a stored scan. Deleting a scan that is already gone succeeds.
//!
//! ## Usage
//!
//! ```bash
//! vibeguard delete 3f9c2a
//! ```

use anyhow::Result;

use crate::errors::display_success;
use crate::exit_codes::*;
use crate::models::ScanId;

use super::{open_store, report};

/// Arguments for the delete command
#[derive(Debug)]
pub struct DeleteArgs {
    pub id: String,
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs) -> Result<i32> {
    let Some(store) = open_store() else {
        return Ok(EXIT_CONFIG_ERROR);
    };

    let id = ScanId::new(args.id.trim());
    match store.delete_scan(&id).await {
        Ok(()) => {
            display_success(&format!("Deleted scan {id}"));
            Ok(EXIT_SUCCESS)
        }
        Err(e) => Ok(report(&e)),
    }
}
