//! # Archive Building
//!
//! Turns dropped or picked filesystem entries into a flat, ordered archive of
//! `(path, content)` pairs, and packages that archive for upload.
//!
//! 1. **Walk** - [`ArchiveBuilder`] flattens any number of top-level entries
//!    (files or directories, arbitrary depth) in deterministic pre-order
//! 2. **Package** - [`package`] writes the archive into a zip container
//!
//! Entries are abstracted behind [`SourceEntry`] so the walk does not care
//! whether they come from the local filesystem ([`FsEntry`]) or elsewhere.

pub mod builder;
pub mod entry;
pub mod package;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

pub use builder::{ArchiveBuilder, normalize_relative_path};
pub use entry::{EntryKind, FsEntry, SourceEntry};
pub use package::package;

/// File name used for uploads when none is given.
pub const DEFAULT_UPLOAD_LABEL: &str = "repo.zip";

/// A single file in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Posix-style path rooted at the top-level entry name, no leading slash
    pub path: String,
    pub content: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A built archive waiting to be submitted.
///
/// Consumed by value on submission, so it can only ever be sent once.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub archive: Vec<ArchiveEntry>,
    /// Upload file name; the service only accepts `*.zip`
    pub label: String,
}

impl PendingUpload {
    pub fn new(archive: Vec<ArchiveEntry>) -> Self {
        Self {
            archive,
            label: DEFAULT_UPLOAD_LABEL.to_string(),
        }
    }

    /// Use a custom upload name. A `.zip` extension is appended if missing.
    pub fn with_label(mut self, label: &str) -> Self {
        let label = label.trim();
        self.label = if label.is_empty() {
            DEFAULT_UPLOAD_LABEL.to_string()
        } else if label.to_lowercase().ends_with(".zip") {
            label.to_string()
        } else {
            format!("{label}.zip")
        };
        self
    }

    pub fn file_count(&self) -> usize {
        self.archive.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.archive.iter().map(|e| e.content.len()).sum()
    }
}

/// Errors raised while walking or packaging an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Two entries resolved to the same archive path
    #[error("Duplicate path in archive: {path}")]
    DuplicatePath { path: String },

    /// Another build is still running on this builder
    #[error("An archive build is already in progress")]
    BuilderBusy,

    /// A file or directory listing could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An entry name or relative path cannot be used as an archive path
    #[error("Invalid archive path: {path:?}")]
    InvalidPath { path: String },

    /// The zip container could not be written
    #[error("Failed to package archive: {message}")]
    Packaging { message: String },
}

impl ArchiveError {
    /// Archive path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ArchiveError::DuplicatePath { path }
            | ArchiveError::ReadFailure { path, .. }
            | ArchiveError::InvalidPath { path } => Some(path),
            ArchiveError::BuilderBusy | ArchiveError::Packaging { .. } => None,
        }
    }
}
