//! Error taxonomy of the submission pipeline.

use thiserror::Error;

use crate::api::ApiError;
use crate::archive::ArchiveError;

/// Coarse classification of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Archive,
    Network,
    Server,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Archive => "archive",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
        }
    }
}

/// Nothing valid to submit. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Nothing to scan: input is empty")]
    EmptyInput,

    #[error("A language is required")]
    MissingLanguage,

    #[error("Invalid scan id: '{id}'")]
    InvalidScanId { id: String },
}

/// Errors surfaced by [`SessionStore`](super::SessionStore) operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Transport failure or unparseable response body
    #[error("Network error: {message}")]
    Network { message: String },

    /// The service answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl From<ApiError> for PipelineError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::BadStatus { status, message } => PipelineError::Server { status, message },
            ApiError::Network { message } => PipelineError::Network { message },
            ApiError::Malformed { message } => PipelineError::Network { message },
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::Archive(_) => ErrorKind::Archive,
            PipelineError::Network { .. } => ErrorKind::Network,
            PipelineError::Server { .. } => ErrorKind::Server,
        }
    }

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            PipelineError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Snapshot retained in [`Phase::Error`](super::Phase::Error).
    pub fn to_failure(&self) -> Failure {
        Failure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// The last error, as kept in session state until the next operation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}
