//! # Session Management
//!
//! The submission pipeline and the session it feeds:
//!
//! - [`submission`] - Validates, packages and sends one scan
//! - [`store`] - Owns history and the active scan, discards stale responses
//! - [`state`] - The state value and its transitions
//! - [`error`] - Pipeline error taxonomy

pub mod error;
pub mod state;
pub mod store;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ErrorKind, Failure, PipelineError, ValidationError};
pub use state::{ActiveScan, Phase, SessionState};
pub use store::{DEFAULT_HISTORY_LIMIT, Resolution, SessionStore};
pub use submission::{DEFAULT_LANGUAGE, ScanInput, ScanRequest, Submission, SubmissionClient};
