//! Per-project session state

use std::path::Path;

use extfile_fs::{ExternalFileStore, NormalizedPath, ResourceLayout};

use crate::Result;
use crate::prompt::ConflictPrompter;
use crate::settings::Settings;

/// Remembered answer to load conflicts for one project.
///
/// At most one preference is set at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictPolicy {
    prefer_project: bool,
    prefer_external: bool,
}

impl ConflictPolicy {
    /// Build a policy; project content wins when both flags are given.
    pub fn new(prefer_project: bool, prefer_external: bool) -> Self {
        Self {
            prefer_project,
            prefer_external: prefer_external && !prefer_project,
        }
    }

    pub fn prefers_project(&self) -> bool {
        self.prefer_project
    }

    pub fn prefers_external(&self) -> bool {
        self.prefer_external
    }

    pub fn is_set(&self) -> bool {
        self.prefer_project || self.prefer_external
    }

    pub fn prefer_project(&mut self) {
        self.prefer_project = true;
        self.prefer_external = false;
    }

    pub fn prefer_external(&mut self) {
        self.prefer_external = true;
        self.prefer_project = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything an engine operation needs besides its own state.
pub struct SyncContext<'a> {
    pub settings: &'a Settings,
    pub store: &'a ExternalFileStore,
    pub policy: &'a mut ConflictPolicy,
    pub prompter: &'a mut dyn ConflictPrompter,
}

/// Settings, file store, conflict policy and prompter of one open project.
pub struct ProjectSession<P = Box<dyn ConflictPrompter>> {
    settings: Settings,
    layout: ResourceLayout,
    store: ExternalFileStore,
    policy: ConflictPolicy,
    prompter: P,
}

impl<P: ConflictPrompter> ProjectSession<P> {
    pub fn new(settings: Settings, layout: ResourceLayout, prompter: P) -> Self {
        let store = ExternalFileStore::new(layout.root.clone());
        Self {
            settings,
            layout,
            store,
            policy: ConflictPolicy::default(),
            prompter,
        }
    }

    /// Session for the project stored at `project_file`, or an unsaved
    /// project rooted at the working directory.
    pub fn open(settings: Settings, project_file: Option<&Path>, prompter: P) -> Result<Self> {
        let layout = ResourceLayout::resolve(project_file, Some(&settings.resource_dir_suffix))?;
        tracing::debug!(root = %layout.root, "Resolved external content root");
        Ok(Self::new(settings, layout, prompter))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    pub fn project_file(&self) -> Option<&NormalizedPath> {
        self.layout.project_file.as_ref()
    }

    pub fn store(&self) -> &ExternalFileStore {
        &self.store
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    pub fn policy_mut(&mut self) -> &mut ConflictPolicy {
        &mut self.policy
    }

    /// Forget remembered conflict answers, as when the project is reopened.
    pub fn reset_policy(&mut self) {
        self.policy.reset();
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    pub fn context(&mut self) -> SyncContext<'_> {
        SyncContext {
            settings: &self.settings,
            store: &self.store,
            policy: &mut self.policy,
            prompter: &mut self.prompter,
        }
    }
}
