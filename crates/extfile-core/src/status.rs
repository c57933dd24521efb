//! Per-holder synchronization status
//!
//! Compares each holder's in-memory content with its external file without
//! touching either.

use std::fmt;

use extfile_fs::ExternalFileStore;
use extfile_fs::checksum::compute_file_checksum;
use serde::{Deserialize, Serialize};

use crate::project::{HolderEntry, Project};

/// State of one holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderState {
    /// Content lives only in the project document
    Inline,
    /// File and memory agree
    InSync,
    /// Memory changed since the last load or save
    Modified,
    /// File and memory disagree and memory is clean
    Diverged,
    /// The external file does not exist
    Missing,
}

impl HolderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::InSync => "in sync",
            Self::Modified => "modified",
            Self::Diverged => "diverged",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for HolderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status line for one holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderStatus {
    pub label: String,
    /// Persisted naming mode, absent when never set
    pub mode: Option<String>,
    pub path: Option<String>,
    pub state: HolderState,
    /// Checksum of the external file content
    pub checksum: Option<String>,
}

/// Status of every holder in a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusReport {
    pub holders: Vec<HolderStatus>,
}

impl StatusReport {
    pub fn collect(project: &Project, store: &ExternalFileStore) -> Self {
        Self {
            holders: project
                .holders()
                .iter()
                .map(|entry| holder_status(entry, store))
                .collect(),
        }
    }

    pub fn count(&self, state: HolderState) -> usize {
        self.holders.iter().filter(|h| h.state == state).count()
    }

    /// True when no holder is modified, diverged or missing.
    pub fn is_clean(&self) -> bool {
        self.holders
            .iter()
            .all(|h| matches!(h.state, HolderState::Inline | HolderState::InSync))
    }
}

fn holder_status(entry: &HolderEntry<'_>, store: &ExternalFileStore) -> HolderStatus {
    let engine = entry.engine;
    let mut status = HolderStatus {
        label: entry.label(),
        mode: engine.naming_mode().map(|mode| mode.to_string()),
        path: None,
        state: HolderState::Inline,
        checksum: None,
    };
    let Some(path) = engine.target_path(&entry.position) else {
        return status;
    };

    let file = store.resolve(&path);
    status.path = Some(file.to_string());
    status.state = match store.read(&file) {
        Err(_) => HolderState::Missing,
        Ok(stored) => {
            status.checksum = compute_file_checksum(&file).ok();
            if engine.is_dirty() {
                HolderState::Modified
            } else if engine.content().is_empty() || engine.content() == stored.content {
                HolderState::InSync
            } else {
                HolderState::Diverged
            }
        }
    };
    status
}
