//! Validation, packaging and sending of a single scan submission.

use crate::api::{ArchiveUpload, ScanService, SnippetScanRequest};
use crate::archive::{FsEntry, PendingUpload, SourceEntry, package};
use crate::models::{ScanKind, ScanResult};

use super::error::{PipelineError, ValidationError};

/// Language sent when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "python";

/// What the user wants scanned.
#[derive(Debug, Clone)]
pub enum ScanInput<E = FsEntry> {
    /// Pasted or typed code
    Snippet { code: String },
    /// Dropped or picked entries, built into an archive first
    Tree(Vec<E>),
    /// An archive that was already built
    Upload(PendingUpload),
}

/// A scan input plus its language hint.
#[derive(Debug, Clone)]
pub struct ScanRequest<E = FsEntry> {
    pub input: ScanInput<E>,
    pub language: String,
}

impl ScanRequest {
    pub fn snippet(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            input: ScanInput::Snippet { code: code.into() },
            language: language.into(),
        }
    }

    pub fn upload(upload: PendingUpload, language: impl Into<String>) -> Self {
        Self {
            input: ScanInput::Upload(upload),
            language: language.into(),
        }
    }
}

impl<E: SourceEntry> ScanRequest<E> {
    pub fn tree(entries: Vec<E>, language: impl Into<String>) -> Self {
        Self {
            input: ScanInput::Tree(entries),
            language: language.into(),
        }
    }
}

/// A submission ready to be sent: text, or a built archive.
#[derive(Debug, Clone)]
pub enum Submission {
    Snippet { code: String },
    Archive(PendingUpload),
}

impl Submission {
    pub fn kind(&self) -> ScanKind {
        match self {
            Submission::Snippet { .. } => ScanKind::Snippet,
            Submission::Archive(_) => ScanKind::Archive,
        }
    }
}

/// Sends submissions to a [`ScanService`] and normalizes the replies.
pub struct SubmissionClient<'a, S> {
    service: &'a S,
}

impl<'a, S: ScanService> SubmissionClient<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Check a submission without touching the network.
    pub fn validate(submission: &Submission, language: &str) -> Result<(), ValidationError> {
        if language.trim().is_empty() {
            return Err(ValidationError::MissingLanguage);
        }
        let empty = match submission {
            Submission::Snippet { code } => code.trim().is_empty(),
            Submission::Archive(upload) => upload.archive.is_empty(),
        };
        if empty {
            return Err(ValidationError::EmptyInput);
        }
        Ok(())
    }

    /// Validate, package and send one submission.
    ///
    /// The upload is consumed, so an archive is sent at most once.
    pub async fn submit(
        &self,
        submission: Submission,
        language: &str,
    ) -> Result<ScanResult, PipelineError> {
        Self::validate(&submission, language)?;
        let language = language.trim();
        let kind = submission.kind();

        let response = match submission {
            Submission::Snippet { code } => {
                let request = SnippetScanRequest {
                    code: &code,
                    language,
                };
                self.service.scan_snippet(&request).await?
            }
            Submission::Archive(upload) => {
                let bytes = package(&upload.archive)?;
                log::debug!(
                    "Uploading {} ({} files, {} bytes zipped)",
                    upload.label,
                    upload.file_count(),
                    bytes.len()
                );
                self.service
                    .scan_archive(ArchiveUpload {
                        file_name: upload.label,
                        bytes,
                        language: language.to_string(),
                    })
                    .await?
            }
        };

        Ok(response.into_result(kind, language))
    }
}
