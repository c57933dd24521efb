//! Per-holder synchronization engine
//!
//! A [`SyncEngine`] owns one holder's in-memory content, naming mode and
//! external path. The file on disk and the inline XML value are sinks: they
//! change only through [`SyncEngine::save`] and [`SyncEngine::commit`].
//!
//! Dirtiness is tracked with two timestamps. The engine is dirty exactly when
//! `last_modified > last_loaded`, where an absent timestamp orders before any
//! present one.

use chrono::{TimeDelta, Utc};
use extfile_fs::{ExternalFileStore, NormalizedPath, StoredContent, Timestamp, WriteMode};

use crate::Result;
use crate::binding::ContentBinding;
use crate::naming::{
    ComposeComponent, ComposeSelectors, ContentKind, NamingMode, PathBuilder, TreePosition,
    derive_path, parse_bool,
};
use crate::prompt::{LoadConflict, LoadConflictChoice, SaveConflict, SaveConflictChoice};
use crate::session::SyncContext;

/// Outcome of [`SyncEngine::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Content now reflects the external file (or the project side of a
    /// resolved conflict)
    Loaded,
    /// Nothing was loaded
    NotLoaded,
    /// The file was missing or outdated and has been written from memory
    SavedOnLoad,
}

/// Outcome of [`SyncEngine::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    NotSaved,
    /// Memory was discarded in favour of the file
    Reloaded,
    /// External content is disabled or the holder is inline only
    Skipped,
}

/// A file move triggered by a name change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub old_path: NormalizedPath,
    pub new_path: NormalizedPath,
    /// False when there was no file to move or the move was declined
    pub moved: bool,
}

/// Synchronization state of one content holder.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    kind: ContentKind,
    binding: ContentBinding,
    content: String,
    naming_mode: Option<NamingMode>,
    external_path: Option<String>,
    selectors: ComposeSelectors,
    last_modified: Option<Timestamp>,
    last_loaded: Option<Timestamp>,
    config_changed: bool,
}

impl SyncEngine {
    /// Initialize from the values persisted in `binding`.
    pub fn new(kind: ContentKind, binding: ContentBinding) -> Self {
        Self {
            content: binding.content().to_string(),
            naming_mode: binding.naming_mode(),
            external_path: binding.external_path().map(str::to_string),
            selectors: binding.compose_selectors(),
            kind,
            binding,
            last_modified: None,
            last_loaded: None,
            config_changed: false,
        }
    }

    pub fn kind(&self) -> &ContentKind {
        &self.kind
    }

    pub fn binding(&self) -> &ContentBinding {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut ContentBinding {
        &mut self.binding
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Persisted naming mode; `None` when the holder never had one.
    pub fn naming_mode(&self) -> Option<NamingMode> {
        self.naming_mode
    }

    pub fn effective_mode(&self) -> NamingMode {
        self.naming_mode.unwrap_or(NamingMode::None)
    }

    pub fn is_external(&self) -> bool {
        self.effective_mode().is_external()
    }

    pub fn external_path(&self) -> Option<&str> {
        self.external_path.as_deref()
    }

    pub fn compose_selectors(&self) -> ComposeSelectors {
        self.selectors
    }

    pub fn last_modified(&self) -> Option<Timestamp> {
        self.last_modified
    }

    pub fn last_loaded(&self) -> Option<Timestamp> {
        self.last_loaded
    }

    pub fn is_dirty(&self) -> bool {
        self.last_modified > self.last_loaded
    }

    /// Naming settings changed since the last save.
    pub fn config_changed(&self) -> bool {
        self.config_changed
    }

    pub fn needs_save(&self) -> bool {
        self.is_external() && (self.is_dirty() || self.config_changed)
    }

    /// True when the holder has an XML configuration element.
    pub fn has_config(&self) -> bool {
        self.binding.element().is_some()
    }

    /// Relative (or absolute manual) path for the current names and mode.
    pub fn target_path(&self, position: &TreePosition) -> Option<String> {
        derive_path(
            self.effective_mode(),
            position,
            &self.kind,
            self.selectors,
            self.external_path.as_deref(),
        )
    }

    /// Replace the content, marking the engine dirty when it changed.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        let content = content.into();
        if content == self.content {
            return false;
        }
        self.content = content;
        self.touch();
        true
    }

    pub fn set_naming_mode(&mut self, mode: NamingMode) {
        if self.naming_mode != Some(mode) {
            self.naming_mode = Some(mode);
            self.config_changed = true;
        }
    }

    /// Switch to MANUAL mode with `path`.
    pub fn set_manual_path(&mut self, path: impl Into<String>) {
        self.naming_mode = Some(NamingMode::Manual);
        self.external_path = Some(path.into());
        self.config_changed = true;
    }

    pub fn set_compose_selectors(&mut self, selectors: ComposeSelectors) {
        if self.selectors != selectors {
            self.selectors = selectors;
            self.config_changed = true;
        }
    }

    /// Set one COMPOSED selector from its persisted string form.
    pub fn set_compose_selector_str(&mut self, component: ComposeComponent, value: &str) {
        let mut selectors = self.selectors;
        selectors.set(component, parse_bool(value));
        self.set_compose_selectors(selectors);
    }

    /// Load content from the external file.
    ///
    /// Inline-only holders never touch the disk. A missing file is created
    /// from the in-memory content when there is any.
    pub fn load(&mut self, position: &TreePosition, ctx: &mut SyncContext<'_>) -> LoadStatus {
        if !self.is_external() {
            return LoadStatus::NotLoaded;
        }
        let Some(path) = self.refresh_path(position) else {
            return LoadStatus::NotLoaded;
        };
        let file = ctx.store.resolve(&path);

        match ctx.store.read(&file) {
            Ok(stored) => self.reconcile(position, ctx, stored),
            Err(e) if e.is_not_found() => {
                if self.content.is_empty() {
                    tracing::debug!(path = %file, "No external file and no content");
                    return LoadStatus::NotLoaded;
                }
                tracing::debug!(path = %file, "External file missing, creating it from project content");
                match self.save(position, ctx, false, true) {
                    SaveStatus::Saved => LoadStatus::SavedOnLoad,
                    _ => LoadStatus::NotLoaded,
                }
            }
            Err(e) => {
                tracing::warn!(path = %file, error = %e, "Cannot read external file");
                LoadStatus::NotLoaded
            }
        }
    }

    fn reconcile(
        &mut self,
        position: &TreePosition,
        ctx: &mut SyncContext<'_>,
        stored: StoredContent,
    ) -> LoadStatus {
        let inline_differs = ctx.settings.keep_in_project
            && !self.content.is_empty()
            && self.content != stored.content;
        if !inline_differs {
            self.accept(stored);
            return LoadStatus::Loaded;
        }

        if stored.content.is_empty() {
            tracing::debug!(path = %stored.path, "External file is empty, keeping project content");
            self.last_loaded = Some(stored.modified);
            self.touch();
            return LoadStatus::Loaded;
        }

        let choice = if ctx.policy.prefers_project() {
            LoadConflictChoice::UseProject
        } else if ctx.policy.prefers_external() {
            LoadConflictChoice::ReloadExternal
        } else {
            let choice = ctx.prompter.resolve_load_conflict(&LoadConflict {
                path: &stored.path,
                project_content: &self.content,
                external_content: &stored.content,
            });
            match choice {
                LoadConflictChoice::UseProjectAlways => ctx.policy.prefer_project(),
                LoadConflictChoice::ReloadExternalAlways => ctx.policy.prefer_external(),
                _ => {}
            }
            choice
        };
        tracing::debug!(path = %stored.path, ?choice, "Resolved load conflict");

        match choice {
            LoadConflictChoice::UseProject | LoadConflictChoice::UseProjectAlways => {
                self.last_loaded = Some(stored.modified);
                self.touch();
                match self.save(position, ctx, false, true) {
                    SaveStatus::Saved => LoadStatus::SavedOnLoad,
                    SaveStatus::Skipped => LoadStatus::Loaded,
                    _ => LoadStatus::NotLoaded,
                }
            }
            LoadConflictChoice::ReloadExternal | LoadConflictChoice::ReloadExternalAlways => {
                self.accept(stored);
                self.binding.set_content(self.content.clone());
                LoadStatus::Loaded
            }
        }
    }

    /// Re-read the external file, discarding in-memory changes.
    pub fn reload(&mut self, position: &TreePosition, store: &ExternalFileStore) -> LoadStatus {
        if !self.is_external() {
            return LoadStatus::NotLoaded;
        }
        let Some(path) = self.refresh_path(position) else {
            return LoadStatus::NotLoaded;
        };
        let file = store.resolve(&path);
        match store.read(&file) {
            Ok(stored) => {
                self.accept(stored);
                LoadStatus::Loaded
            }
            Err(e) => {
                if !e.is_not_found() {
                    tracing::warn!(path = %file, error = %e, "Cannot reload external file");
                }
                LoadStatus::NotLoaded
            }
        }
    }

    /// Write the content to its external file.
    ///
    /// `config_changed` requests overwrite confirmation when the target
    /// exists; `force` writes even when the content is clean.
    pub fn save(
        &mut self,
        position: &TreePosition,
        ctx: &mut SyncContext<'_>,
        config_changed: bool,
        force: bool,
    ) -> SaveStatus {
        if !ctx.settings.content_in_external_file || !self.is_external() {
            return SaveStatus::Skipped;
        }
        let Some(path) = self.refresh_path(position) else {
            return SaveStatus::Skipped;
        };
        let config_changed = config_changed || self.config_changed;
        let mut file = ctx.store.resolve(&path);

        if config_changed && ctx.store.exists(&file) && !ctx.prompter.confirm_overwrite(&file) {
            let Some(chosen) = ctx.prompter.choose_save_as(&file) else {
                tracing::debug!(path = %file, "Overwrite declined and no alternative chosen");
                return SaveStatus::NotSaved;
            };
            let manual = self.switch_to_manual(position, &chosen);
            file = ctx.store.resolve(&manual);
        }

        if self.edited_on_both_sides(ctx.store, &file) {
            let choice = ctx.prompter.resolve_save_conflict(&SaveConflict {
                path: &file,
                memory_content: &self.content,
            });
            if choice == SaveConflictChoice::DiscardAndReload {
                return match self.reload(position, ctx.store) {
                    LoadStatus::Loaded => SaveStatus::Reloaded,
                    _ => SaveStatus::NotSaved,
                };
            }
        }

        let mode = WriteMode {
            dirty: force || config_changed || self.is_dirty(),
            normalize_line_breaks: ctx.settings.normalize_line_breaks,
        };
        match ctx.store.write(&file, &self.content, mode) {
            Ok(outcome) => {
                self.last_modified = Some(outcome.modified);
                self.last_loaded = Some(outcome.modified);
                self.config_changed = false;
                SaveStatus::Saved
            }
            Err(e) => {
                tracing::warn!(path = %file, error = %e, "Cannot write external file");
                SaveStatus::NotSaved
            }
        }
    }

    /// Move the external file after a name change.
    ///
    /// Only derived modes react; returns `None` when the path is unchanged.
    /// When the move is declined or fails the holder is pinned to its old
    /// file in MANUAL mode, so later saves never leave a second copy behind.
    pub fn rename(&mut self, position: &TreePosition, ctx: &mut SyncContext<'_>) -> Option<RenameOutcome> {
        if !self.effective_mode().is_derived() {
            return None;
        }
        let new_path = self.target_path(position)?;
        let old_path = self.external_path.clone()?;
        if old_path == new_path {
            return None;
        }

        let old_file = ctx.store.resolve(&old_path);
        let mut new_file = ctx.store.resolve(&new_path);
        if !ctx.store.exists(&old_file) {
            tracing::debug!(from = %old_file, to = %new_file, "No external file to move");
            self.external_path = Some(new_path);
            return Some(RenameOutcome {
                old_path: old_file,
                new_path: new_file,
                moved: false,
            });
        }

        let mut target = new_path;
        let mut manual = false;
        if ctx.store.exists(&new_file) && !ctx.prompter.confirm_overwrite(&new_file) {
            let Some(chosen) = ctx.prompter.choose_save_as(&new_file) else {
                tracing::debug!(path = %new_file, "Move declined, file left in place");
                self.pin_to(old_path);
                return Some(RenameOutcome {
                    old_path: old_file,
                    new_path: new_file,
                    moved: false,
                });
            };
            target = PathBuilder::new(position, &self.kind).manual(&chosen);
            new_file = ctx.store.resolve(&target);
            manual = true;
        }

        let moved = match ctx.store.move_file(&old_file, &new_file) {
            Ok(()) => {
                if manual {
                    self.naming_mode = Some(NamingMode::Manual);
                }
                self.external_path = Some(target);
                true
            }
            Err(e) => {
                tracing::warn!(from = %old_file, to = %new_file, error = %e, "Cannot move external file");
                self.pin_to(old_path);
                false
            }
        };
        Some(RenameOutcome {
            old_path: old_file,
            new_path: new_file,
            moved,
        })
    }

    /// Delete the external file of a derived-mode holder.
    pub fn delete(&mut self, position: &TreePosition, store: &ExternalFileStore) -> bool {
        if !self.effective_mode().is_derived() {
            return false;
        }
        let Some(path) = self
            .external_path
            .clone()
            .or_else(|| self.target_path(position))
        else {
            return false;
        };
        match store.delete(&store.resolve(&path)) {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Cannot delete external file");
                false
            }
        }
    }

    /// Push content and naming attributes into the binding.
    ///
    /// External holders keep their content inline only when `inline` is set.
    pub fn commit(&mut self, inline: bool) -> Result<()> {
        let keep_inline = inline || !self.is_external();
        self.binding.set_naming_mode(self.naming_mode);
        self.binding.set_external_path(self.external_path.clone());
        self.binding.set_compose_selectors(self.selectors);
        self.binding.set_content(if keep_inline {
            self.content.clone()
        } else {
            String::new()
        });
        self.binding.commit().inspect_err(|e| {
            tracing::error!(error = %e, "Cannot commit content to project configuration");
        })
    }

    fn accept(&mut self, stored: StoredContent) {
        self.content = stored.content;
        self.last_loaded = Some(stored.modified);
        self.last_modified = Some(stored.modified);
    }

    fn touch(&mut self) {
        let now = Utc::now();
        self.last_modified = Some(match self.last_loaded {
            Some(loaded) if now <= loaded => loaded + TimeDelta::milliseconds(1),
            _ => now,
        });
    }

    fn edited_on_both_sides(&self, store: &ExternalFileStore, file: &NormalizedPath) -> bool {
        let (Some(loaded), Some(disk)) = (self.last_loaded, store.modified(file)) else {
            return false;
        };
        disk > loaded && self.is_dirty()
    }

    fn refresh_path(&mut self, position: &TreePosition) -> Option<String> {
        let path = self.target_path(position)?;
        if self.external_path.as_deref() != Some(path.as_str()) {
            tracing::debug!(path = %path, "External path updated");
            self.external_path = Some(path.clone());
        }
        Some(path)
    }

    fn pin_to(&mut self, path: String) {
        tracing::debug!(path = %path, "Keeping external file at its old path");
        self.naming_mode = Some(NamingMode::Manual);
        self.external_path = Some(path);
    }

    fn switch_to_manual(&mut self, position: &TreePosition, chosen: &str) -> String {
        let path = PathBuilder::new(position, &self.kind).manual(chosen);
        self.naming_mode = Some(NamingMode::Manual);
        self.external_path = Some(path.clone());
        path
    }
}
