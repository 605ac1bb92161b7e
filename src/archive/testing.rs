//! In-memory entry tree for tests.

use std::io;

use super::entry::{EntryKind, SourceEntry};

#[derive(Debug, Clone)]
pub(crate) enum MemEntry {
    File {
        name: String,
        content: Vec<u8>,
        hint: Option<String>,
        readable: bool,
    },
    Dir {
        name: String,
        children: Vec<MemEntry>,
    },
}

impl MemEntry {
    pub(crate) fn file(name: &str, content: &str) -> Self {
        MemEntry::File {
            name: name.to_string(),
            content: content.as_bytes().to_vec(),
            hint: None,
            readable: true,
        }
    }

    pub(crate) fn dir(name: &str, children: Vec<MemEntry>) -> Self {
        MemEntry::Dir {
            name: name.to_string(),
            children,
        }
    }

    pub(crate) fn unreadable(name: &str) -> Self {
        MemEntry::File {
            name: name.to_string(),
            content: Vec::new(),
            hint: None,
            readable: false,
        }
    }

    /// A picker-selected file carrying its full relative path.
    pub(crate) fn picked(relative_path: &str, content: &str) -> Self {
        let name = relative_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(relative_path)
            .to_string();
        MemEntry::File {
            name,
            content: content.as_bytes().to_vec(),
            hint: Some(relative_path.to_string()),
            readable: true,
        }
    }
}

impl SourceEntry for MemEntry {
    fn name(&self) -> &str {
        match self {
            MemEntry::File { name, .. } | MemEntry::Dir { name, .. } => name,
        }
    }

    fn kind(&self) -> EntryKind {
        match self {
            MemEntry::File { .. } => EntryKind::File,
            MemEntry::Dir { .. } => EntryKind::Directory,
        }
    }

    fn relative_path_hint(&self) -> Option<&str> {
        match self {
            MemEntry::File { hint, .. } => hint.as_deref(),
            MemEntry::Dir { .. } => None,
        }
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::task::yield_now().await;
        match self {
            MemEntry::File {
                content,
                readable: true,
                ..
            } => Ok(content.clone()),
            MemEntry::File { .. } => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            MemEntry::Dir { .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "is a directory",
            )),
        }
    }

    async fn children(&self) -> io::Result<Vec<Self>> {
        tokio::task::yield_now().await;
        match self {
            MemEntry::Dir { children, .. } => Ok(children.clone()),
            MemEntry::File { .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )),
        }
    }
}
