//! # Source Entries
//!
//! The [`SourceEntry`] trait is the walk's only view of the outside world:
//! whether an entry is a file or a directory, its bytes, and its children.
//! [`FsEntry`] implements it on top of `tokio::fs`.

use std::io;
use std::path::{Path, PathBuf};

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A dropped or picked filesystem item.
///
/// Reading and listing are asynchronous; the builder awaits them one at a
/// time and makes no assumption about the order children are reported in.
#[allow(async_fn_in_trait)]
pub trait SourceEntry: Sized {
    /// Name of this entry within its parent (a single path component).
    fn name(&self) -> &str;

    fn kind(&self) -> EntryKind;

    /// Full relative path for picker-sourced files, including the root folder.
    ///
    /// Only consulted for top-level entries.
    fn relative_path_hint(&self) -> Option<&str> {
        None
    }

    /// Read the entry's bytes. Only called on files.
    async fn read(&self) -> io::Result<Vec<u8>>;

    /// List immediate children. Only called on directories.
    async fn children(&self) -> io::Result<Vec<Self>>;
}

/// An entry on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsEntry {
    path: PathBuf,
    name: String,
    kind: EntryKind,
    hint: Option<String>,
}

impl FsEntry {
    /// Open a dropped path. Symlinks are followed at the top level.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        let kind = kind_of(&metadata).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is neither a file nor a directory", path.display()),
            )
        })?;
        let name = entry_name(&path).await?;

        Ok(Self {
            path,
            name,
            kind,
            hint: None,
        })
    }

    /// Open a picker-selected file with its relative path (e.g. `proj/src/app.py`).
    pub async fn picked(path: impl AsRef<Path>, relative_path: impl Into<String>) -> io::Result<Self> {
        let mut entry = Self::open(path).await?;
        if entry.kind != EntryKind::File {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", entry.path.display()),
            ));
        }
        entry.hint = Some(relative_path.into());
        Ok(entry)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceEntry for FsEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntryKind {
        self.kind
    }

    fn relative_path_hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Children sorted by name so repeated walks of the same tree agree.
    ///
    /// Symlinks to files are followed; symlinks to directories are skipped
    /// so a link cycle cannot make the walk unbounded.
    async fn children(&self) -> io::Result<Vec<Self>> {
        let mut reader = tokio::fs::read_dir(&self.path).await?;
        let mut children = Vec::new();

        while let Some(dir_entry) = reader.next_entry().await? {
            let path = dir_entry.path();
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            let file_type = dir_entry.file_type().await?;

            let kind = if file_type.is_symlink() {
                match tokio::fs::metadata(&path).await {
                    Ok(target) if target.is_file() => Some(EntryKind::File),
                    Ok(_) => {
                        log::debug!("Skipping symlinked directory {}", path.display());
                        None
                    }
                    Err(e) => {
                        log::debug!("Skipping dangling symlink {}: {}", path.display(), e);
                        None
                    }
                }
            } else if file_type.is_dir() {
                Some(EntryKind::Directory)
            } else if file_type.is_file() {
                Some(EntryKind::File)
            } else {
                log::debug!("Skipping special file {}", path.display());
                None
            };

            if let Some(kind) = kind {
                children.push(FsEntry {
                    path,
                    name,
                    kind,
                    hint: None,
                });
            }
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }
}

fn kind_of(metadata: &std::fs::Metadata) -> Option<EntryKind> {
    if metadata.is_dir() {
        Some(EntryKind::Directory)
    } else if metadata.is_file() {
        Some(EntryKind::File)
    } else {
        None
    }
}

/// Name of a dropped path. Paths like `.` or `..` resolve to the real directory name.
async fn entry_name(path: &Path) -> io::Result<String> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = tokio::fs::canonicalize(path).await?;
    Ok(canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string()))
}
