//! Project-wide save
//!
//! Saving a project runs three passes over its holders:
//!
//! 1. **Auto-convert**: holders without a naming mode are switched to AUTO
//!    and written once, when the `auto_convert` setting is on. Holders with
//!    an explicit NONE mode are left alone.
//! 2. **Save**: every engine with unsaved content or naming changes writes
//!    its external file.
//! 3. **Commit**: every holder pushes its values into the document, which is
//!    then written atomically.

use extfile_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::engine::SaveStatus;
use crate::naming::NamingMode;
use crate::project::Project;
use crate::prompt::ConflictPrompter;
use crate::session::ProjectSession;
use crate::{Error, Result};

/// Holder labels grouped by what happened to them during a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    /// Holders whose external file was written (or already up to date)
    pub saved: Vec<String>,
    /// Holders that took the file content after a save conflict
    pub reloaded: Vec<String>,
    /// Holders whose file could not be written; their content is kept inline
    pub failed: Vec<String>,
    /// Holders switched to AUTO by the auto-convert pass
    pub converted: Vec<String>,
    /// Holders whose values could not be committed to the document
    pub commit_errors: Vec<String>,
    /// Where the project document was written
    pub project_file: Option<NormalizedPath>,
}

impl SaveSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.commit_errors.is_empty()
    }

    fn record(&mut self, label: String, status: SaveStatus) {
        match status {
            SaveStatus::Saved => self.saved.push(label),
            SaveStatus::Reloaded => self.reloaded.push(label),
            SaveStatus::NotSaved => self.failed.push(label),
            SaveStatus::Skipped => {}
        }
    }
}

/// Saves whole projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectSaveCoordinator;

impl ProjectSaveCoordinator {
    /// Save external files and the project document to the project's path.
    ///
    /// Inline copies of external content are kept only when the
    /// `keep_in_project` setting is on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoProjectPath`] for a project that was never saved, or
    /// the error from writing the document.
    pub fn save<P: ConflictPrompter>(
        project: &mut Project,
        session: &mut ProjectSession<P>,
    ) -> Result<SaveSummary> {
        let target = project.path().cloned().ok_or(Error::NoProjectPath)?;
        Self::run(project, session, &target, false)
    }

    /// Like [`ProjectSaveCoordinator::save`], but every holder's content is
    /// also written inline so the document stands on its own.
    pub fn save_including_externalized<P: ConflictPrompter>(
        project: &mut Project,
        session: &mut ProjectSession<P>,
    ) -> Result<SaveSummary> {
        let target = project.path().cloned().ok_or(Error::NoProjectPath)?;
        Self::run(project, session, &target, true)
    }

    /// Write a self-contained copy of the project to `target`.
    ///
    /// The project keeps its own path; `target` receives the document with
    /// all content inline.
    pub fn save_as_including_externalized<P: ConflictPrompter>(
        project: &mut Project,
        session: &mut ProjectSession<P>,
        target: &NormalizedPath,
    ) -> Result<SaveSummary> {
        Self::run(project, session, target, true)
    }

    fn run<P: ConflictPrompter>(
        project: &mut Project,
        session: &mut ProjectSession<P>,
        target: &NormalizedPath,
        force_inline: bool,
    ) -> Result<SaveSummary> {
        let settings = session.settings().clone();
        let auto_convert = settings.auto_convert && settings.content_in_external_file;
        let mut summary = SaveSummary::default();

        let mut ctx = session.context();
        project.for_each_holder_mut(|position, engine| {
            let label = position.label(engine.kind());
            if auto_convert && engine.naming_mode().is_none() && engine.has_config() {
                tracing::debug!(holder = %label, "Converting holder to external content");
                engine.set_naming_mode(NamingMode::Auto);
                summary.converted.push(label.clone());
                summary.record(label, engine.save(position, &mut ctx, false, true));
            } else if engine.needs_save() {
                summary.record(label, engine.save(position, &mut ctx, false, false));
            }
        });

        let keep_inline =
            force_inline || settings.keep_in_project || !settings.content_in_external_file;
        let store = session.store();
        project.for_each_holder_mut(|position, engine| {
            let label = position.label(engine.kind());
            let file_missing = engine
                .target_path(position)
                .is_some_and(|path| !store.exists(&store.resolve(&path)));
            let inline = keep_inline || file_missing || summary.failed.contains(&label);
            if let Err(e) = engine.commit(inline) {
                summary.commit_errors.push(format!("{label}: {e}"));
            }
        });

        project.write_to(target)?;
        summary.project_file = Some(target.clone());
        tracing::info!(
            path = %target,
            saved = summary.saved.len(),
            reloaded = summary.reloaded.len(),
            failed = summary.failed.len(),
            converted = summary.converted.len(),
            "Saved project"
        );
        Ok(summary)
    }
}
