//! # Archive Builder
//!
//! Flattens a forest of [`SourceEntry`] values into an ordered archive.
//!
//! The walk is a depth-first pre-order driven by an explicit stack: children
//! are emitted in the order they are reported, and a directory's subtree is
//! fully emitted before its next sibling. Nothing is recursive, so depth is
//! only bounded by memory.

use std::cell::Cell;
use std::collections::HashSet;

use super::entry::{EntryKind, SourceEntry};
use super::{ArchiveEntry, ArchiveError};

/// Single-flight archive builder.
///
/// At most one build runs at a time; a second concurrent `build` fails with
/// [`ArchiveError::BuilderBusy`] instead of waiting.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    in_flight: Cell<bool>,
}

/// Releases the in-flight flag on every exit path, including early returns
/// and a dropped build future.
struct BuildGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a build is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    fn acquire(&self) -> Result<BuildGuard<'_>, ArchiveError> {
        if self.in_flight.replace(true) {
            return Err(ArchiveError::BuilderBusy);
        }
        Ok(BuildGuard {
            flag: &self.in_flight,
        })
    }

    /// Build an archive from top-level entries.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ArchiveEntry>)` - Every reachable file, in pre-order (may be empty)
    /// * `Err(ArchiveError)` - Busy, duplicate path, invalid name, or read failure;
    ///   no partial archive is ever returned
    pub async fn build<E: SourceEntry>(
        &self,
        roots: Vec<E>,
    ) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let _guard = self.acquire()?;

        let mut archive = Vec::new();
        let mut emitted = EmittedPaths::default();
        let mut stack: Vec<(E, String)> = Vec::new();

        push_siblings(&mut stack, roots, None)?;

        while let Some((entry, path)) = stack.pop() {
            match entry.kind() {
                EntryKind::File => {
                    claim_path(&mut emitted, &path)?;
                    let content = entry
                        .read()
                        .await
                        .map_err(|source| ArchiveError::ReadFailure {
                            path: path.clone(),
                            source,
                        })?;
                    archive.push(ArchiveEntry { path, content });
                }
                EntryKind::Directory => {
                    let children =
                        entry
                            .children()
                            .await
                            .map_err(|source| ArchiveError::ReadFailure {
                                path: path.clone(),
                                source,
                            })?;
                    push_siblings(&mut stack, children, Some(&path))?;
                }
            }
        }

        log::debug!("Built archive with {} entries", archive.len());
        Ok(archive)
    }
}

/// File paths already in the archive, and every directory they imply.
#[derive(Default)]
struct EmittedPaths {
    files: HashSet<String>,
    directories: HashSet<String>,
}

/// Record a file path, failing if it is already a file, is already a
/// directory prefix of another file, or has a file as an ancestor.
fn claim_path(emitted: &mut EmittedPaths, path: &str) -> Result<(), ArchiveError> {
    let duplicate = || ArchiveError::DuplicatePath {
        path: path.to_string(),
    };
    if emitted.files.contains(path) || emitted.directories.contains(path) {
        return Err(duplicate());
    }
    let ancestors: Vec<&str> = path
        .match_indices('/')
        .map(|(idx, _)| &path[..idx])
        .collect();
    if ancestors.iter().any(|dir| emitted.files.contains(*dir)) {
        return Err(duplicate());
    }
    emitted
        .directories
        .extend(ancestors.into_iter().map(str::to_string));
    emitted.files.insert(path.to_string());
    Ok(())
}

/// Resolve the paths of one sibling group and push it so the first reported
/// sibling is popped first.
fn push_siblings<E: SourceEntry>(
    stack: &mut Vec<(E, String)>,
    siblings: Vec<E>,
    parent: Option<&str>,
) -> Result<(), ArchiveError> {
    let mut names: HashSet<String> = HashSet::with_capacity(siblings.len());
    let mut resolved = Vec::with_capacity(siblings.len());

    for entry in siblings {
        let path = entry_path(&entry, parent)?;
        if !names.insert(path.clone()) {
            return Err(ArchiveError::DuplicatePath { path });
        }
        resolved.push((entry, path));
    }

    stack.extend(resolved.into_iter().rev());
    Ok(())
}

fn entry_path<E: SourceEntry>(entry: &E, parent: Option<&str>) -> Result<String, ArchiveError> {
    match parent {
        Some(parent) => Ok(format!("{}/{}", parent, validate_name(entry.name())?)),
        None => match entry.relative_path_hint() {
            Some(hint) if entry.kind() == EntryKind::File => normalize_relative_path(hint),
            _ => validate_name(entry.name()).map(str::to_string),
        },
    }
}

fn validate_name(name: &str) -> Result<&str, ArchiveError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ArchiveError::InvalidPath {
            path: name.to_string(),
        });
    }
    Ok(name)
}

/// Normalize a picker-style relative path into an archive path.
///
/// Backslashes become `/`, empty and `.` components are dropped. Any `..`
/// component, or a path with nothing left, is rejected.
///
/// # Example
///
/// ```rust
/// use vibeguard::archive::normalize_relative_path;
///
/// assert_eq!(normalize_relative_path("./proj\\src/app.py").unwrap(), "proj/src/app.py");
/// assert!(normalize_relative_path("../etc/passwd").is_err());
/// ```
pub fn normalize_relative_path(raw: &str) -> Result<String, ArchiveError> {
    let unified = raw.replace('\\', "/");
    let mut parts = Vec::new();

    for part in unified.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(ArchiveError::InvalidPath {
                    path: raw.to_string(),
                });
            }
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        return Err(ArchiveError::InvalidPath {
            path: raw.to_string(),
        });
    }
    Ok(parts.join("/"))
}
