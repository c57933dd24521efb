//! External content file store
//!
//! Reads and writes text files at paths computed relative to a project
//! resource root, tracks modification times and cleans up directories left
//! empty by deletes and moves.

use std::fs;

use crate::path::is_absolute_str;
use crate::{Error, NormalizedPath, Result, Timestamp, io};

/// Content read from an external file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    /// The path the content was actually found at (may differ from the
    /// requested path by Unicode normalization)
    pub path: NormalizedPath,
    /// File text
    pub content: String,
    /// Modification time on disk
    pub modified: Timestamp,
}

/// How a write should be performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteMode {
    /// The in-memory content changed since the last sync
    pub dirty: bool,
    /// Convert line breaks to the platform separator before writing
    pub normalize_line_breaks: bool,
}

/// Result of a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Modification time of the file after the request
    pub modified: Timestamp,
    /// False when the physical write was skipped
    pub written: bool,
}

/// Text file store rooted at a project's resource directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFileStore {
    root: NormalizedPath,
}

impl ExternalFileStore {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }

    /// The resource root.
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Resolve a stored path against the root.
    ///
    /// Absolute paths are returned unchanged; relative ones are appended to
    /// the root.
    pub fn resolve(&self, path: &str) -> NormalizedPath {
        if is_absolute_str(path) {
            NormalizedPath::new(path)
        } else {
            self.root.join(path.trim_start_matches(['/', '\\']))
        }
    }

    /// True when a file exists at `path` under any Unicode spelling.
    pub fn exists(&self, path: &NormalizedPath) -> bool {
        io::locate(path).is_some()
    }

    /// Disk modification time of the file at `path`.
    pub fn modified(&self, path: &NormalizedPath) -> Option<Timestamp> {
        io::locate(path).as_ref().and_then(io::modified)
    }

    /// Read a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when neither the literal path nor its
    /// NFC/NFD spellings exist.
    pub fn read(&self, path: &NormalizedPath) -> Result<StoredContent> {
        let found = io::locate(path).ok_or_else(|| Error::NotFound {
            path: path.to_native(),
        })?;
        if &found != path {
            tracing::debug!(requested = %path, found = %found, "Matched file by Unicode normalization");
        }

        let content = io::read_text(&found)?;
        let modified = io::modified(&found).ok_or_else(|| Error::NotFound {
            path: found.to_native(),
        })?;

        Ok(StoredContent {
            path: found,
            content,
            modified,
        })
    }

    /// Write `content` to `path`, creating parent directories.
    ///
    /// The physical write is skipped when the content is not dirty, no
    /// line-break normalization is requested and the file already exists.
    pub fn write(&self, path: &NormalizedPath, content: &str, mode: WriteMode) -> Result<WriteOutcome> {
        let existing = io::locate(path);

        if !mode.dirty
            && !mode.normalize_line_breaks
            && let Some(modified) = existing.as_ref().and_then(io::modified)
        {
            tracing::debug!(path = %path, "Content unchanged, skipping write");
            return Ok(WriteOutcome {
                modified,
                written: false,
            });
        }

        let target = existing.unwrap_or_else(|| path.clone());
        if mode.normalize_line_breaks {
            io::write_text(&target, &io::normalize_line_breaks(content))?;
        } else {
            io::write_text(&target, content)?;
        }
        tracing::info!(path = %target, bytes = content.len(), "Wrote external content");

        Ok(WriteOutcome {
            modified: io::modified(&target).unwrap_or_else(chrono::Utc::now),
            written: true,
        })
    }

    /// Delete the file at `path` and prune now-empty parent directories.
    ///
    /// Returns false when there was no file to delete.
    pub fn delete(&self, path: &NormalizedPath) -> Result<bool> {
        let Some(found) = io::locate(path) else {
            tracing::debug!(path = %path, "Nothing to delete");
            return Ok(false);
        };

        fs::remove_file(found.to_native()).map_err(|e| Error::io(found.to_native(), e))?;
        tracing::info!(path = %found, "Deleted external content");

        if let Some(parent) = found.parent() {
            self.prune_empty_dirs(&parent);
        }
        Ok(true)
    }

    /// Move a file from `from` to `to`.
    ///
    /// Overwrites an existing target; confirmation is the caller's job.
    /// Source directories left empty are pruned.
    pub fn move_file(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
        let source = io::locate(from).ok_or_else(|| Error::NotFound {
            path: from.to_native(),
        })?;
        let target = to.to_native();

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        if let Err(rename_err) = fs::rename(source.to_native(), &target) {
            // Rename fails across devices; fall back to copy + remove
            tracing::debug!(error = %rename_err, "Rename failed, copying instead");
            fs::copy(source.to_native(), &target).map_err(|e| Error::io(&target, e))?;
            fs::remove_file(source.to_native()).map_err(|e| Error::io(source.to_native(), e))?;
        }
        tracing::info!(from = %source, to = %to, "Moved external content");

        if let Some(parent) = source.parent() {
            self.prune_empty_dirs(&parent);
        }
        Ok(())
    }

    /// Remove `dir` and its ancestors while they are empty.
    ///
    /// Stops at the store root (which is never removed), at the filesystem
    /// root, or at the first directory that still has entries.
    pub fn prune_empty_dirs(&self, dir: &NormalizedPath) {
        let mut current = Some(dir.clone());
        while let Some(dir) = current {
            if dir == self.root || dir.parent().is_none() || !is_empty_dir(&dir) {
                break;
            }
            if let Err(e) = fs::remove_dir(dir.to_native()) {
                tracing::debug!(dir = %dir, error = %e, "Stopped pruning");
                break;
            }
            tracing::debug!(dir = %dir, "Removed empty directory");
            current = dir.parent();
        }
    }
}

fn is_empty_dir(dir: &NormalizedPath) -> bool {
    fs::read_dir(dir.to_native())
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
