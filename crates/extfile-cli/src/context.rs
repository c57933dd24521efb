//! Project context for commands
//!
//! Resolves the settings file for a project and opens the project together
//! with its session.

use std::path::{Path, PathBuf};

use extfile_core::{ConflictPrompter, Project, ProjectSession, ScriptedPrompter, Settings};
use extfile_fs::NormalizedPath;

use crate::error::{CliError, Result};
use crate::interactive::DialoguerPrompter;

/// Settings file looked up next to the project when `--settings` is absent.
pub const SETTINGS_FILE: &str = "extfile.toml";

/// Options shared by every project command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub settings: Option<PathBuf>,
    pub yes: bool,
}

impl GlobalOptions {
    /// Settings path for `project`: the explicit one, or `extfile.toml` beside it.
    pub fn settings_path(&self, project: &Path) -> NormalizedPath {
        match &self.settings {
            Some(path) => NormalizedPath::new(path),
            None => {
                let dir = project.parent().unwrap_or_else(|| Path::new("."));
                NormalizedPath::new(dir.join(SETTINGS_FILE))
            }
        }
    }

    fn prompter(&self) -> Box<dyn ConflictPrompter> {
        if self.yes {
            Box::new(ScriptedPrompter::new())
        } else {
            Box::new(DialoguerPrompter::new())
        }
    }
}

/// An open project and its session.
pub struct ProjectContext {
    pub project: Project,
    pub session: ProjectSession,
}

impl ProjectContext {
    /// Open the project at `path` without touching any external file.
    pub fn open(path: &Path, options: &GlobalOptions) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::user(format!(
                "Project file not found: {}",
                path.display()
            )));
        }
        let settings = Settings::load(&options.settings_path(path))?;
        let project = Project::open(path)?;
        let session = ProjectSession::open(settings, Some(path), options.prompter())?;
        tracing::debug!(project = %project.name(), root = %session.store().root(), "Opened project context");
        Ok(Self { project, session })
    }

    /// Open the project and load every holder from its external file.
    pub fn open_loaded(path: &Path, options: &GlobalOptions) -> Result<Self> {
        let mut ctx = Self::open(path, options)?;
        ctx.project.load_external(&mut ctx.session);
        Ok(ctx)
    }
}
