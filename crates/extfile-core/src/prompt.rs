//! Conflict prompts
//!
//! The engine never decides a conflict on its own. It asks a
//! [`ConflictPrompter`], which is a terminal UI in the CLI and a
//! [`ScriptedPrompter`] in tests and non-interactive runs.

use std::collections::VecDeque;

use extfile_fs::NormalizedPath;

/// Answer to a load-time content conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadConflictChoice {
    /// Keep the project content for this holder
    UseProject,
    /// Keep the project content and stop asking for this project
    UseProjectAlways,
    /// Take the external file content for this holder
    ReloadExternal,
    /// Take the external file content and stop asking for this project
    ReloadExternalAlways,
}

/// Answer to a save-time timestamp conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveConflictChoice {
    OverwriteWithMemory,
    DiscardAndReload,
}

/// Project and file content disagree on load.
#[derive(Debug, Clone, Copy)]
pub struct LoadConflict<'a> {
    pub path: &'a NormalizedPath,
    pub project_content: &'a str,
    pub external_content: &'a str,
}

/// File and memory both changed since the last sync.
#[derive(Debug, Clone, Copy)]
pub struct SaveConflict<'a> {
    pub path: &'a NormalizedPath,
    pub memory_content: &'a str,
}

/// Asks the user how to resolve conflicts.
pub trait ConflictPrompter {
    fn resolve_load_conflict(&mut self, conflict: &LoadConflict<'_>) -> LoadConflictChoice;

    /// Confirm overwriting an existing file.
    fn confirm_overwrite(&mut self, path: &NormalizedPath) -> bool;

    /// Ask for another target path; `None` aborts.
    fn choose_save_as(&mut self, suggested: &NormalizedPath) -> Option<String>;

    fn resolve_save_conflict(&mut self, conflict: &SaveConflict<'_>) -> SaveConflictChoice;
}

impl<T: ConflictPrompter + ?Sized> ConflictPrompter for Box<T> {
    fn resolve_load_conflict(&mut self, conflict: &LoadConflict<'_>) -> LoadConflictChoice {
        (**self).resolve_load_conflict(conflict)
    }

    fn confirm_overwrite(&mut self, path: &NormalizedPath) -> bool {
        (**self).confirm_overwrite(path)
    }

    fn choose_save_as(&mut self, suggested: &NormalizedPath) -> Option<String> {
        (**self).choose_save_as(suggested)
    }

    fn resolve_save_conflict(&mut self, conflict: &SaveConflict<'_>) -> SaveConflictChoice {
        (**self).resolve_save_conflict(conflict)
    }
}

/// A prompt that was asked, for assertions in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRecord {
    LoadConflict { path: NormalizedPath },
    ConfirmOverwrite { path: NormalizedPath },
    SaveAs { path: NormalizedPath },
    SaveConflict { path: NormalizedPath },
}

/// Prompter answering from queues, then from fixed defaults.
///
/// Defaults keep the project side and confirm overwrites.
#[derive(Debug, Clone)]
pub struct ScriptedPrompter {
    load_answers: VecDeque<LoadConflictChoice>,
    overwrite_answers: VecDeque<bool>,
    save_as_answers: VecDeque<Option<String>>,
    save_answers: VecDeque<SaveConflictChoice>,
    pub default_load: LoadConflictChoice,
    pub default_overwrite: bool,
    pub default_save: SaveConflictChoice,
    asked: Vec<PromptRecord>,
}

impl Default for ScriptedPrompter {
    fn default() -> Self {
        Self {
            load_answers: VecDeque::new(),
            overwrite_answers: VecDeque::new(),
            save_as_answers: VecDeque::new(),
            save_answers: VecDeque::new(),
            default_load: LoadConflictChoice::UseProject,
            default_overwrite: true,
            default_save: SaveConflictChoice::OverwriteWithMemory,
            asked: Vec::new(),
        }
    }
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_load(mut self, choice: LoadConflictChoice) -> Self {
        self.load_answers.push_back(choice);
        self
    }

    pub fn answer_overwrite(mut self, confirm: bool) -> Self {
        self.overwrite_answers.push_back(confirm);
        self
    }

    pub fn answer_save_as(mut self, path: Option<&str>) -> Self {
        self.save_as_answers.push_back(path.map(str::to_string));
        self
    }

    pub fn answer_save(mut self, choice: SaveConflictChoice) -> Self {
        self.save_answers.push_back(choice);
        self
    }

    /// Prompts asked so far, oldest first.
    pub fn asked(&self) -> &[PromptRecord] {
        &self.asked
    }
}

impl ConflictPrompter for ScriptedPrompter {
    fn resolve_load_conflict(&mut self, conflict: &LoadConflict<'_>) -> LoadConflictChoice {
        self.asked.push(PromptRecord::LoadConflict {
            path: conflict.path.clone(),
        });
        self.load_answers.pop_front().unwrap_or(self.default_load)
    }

    fn confirm_overwrite(&mut self, path: &NormalizedPath) -> bool {
        self.asked
            .push(PromptRecord::ConfirmOverwrite { path: path.clone() });
        self.overwrite_answers
            .pop_front()
            .unwrap_or(self.default_overwrite)
    }

    fn choose_save_as(&mut self, suggested: &NormalizedPath) -> Option<String> {
        self.asked.push(PromptRecord::SaveAs {
            path: suggested.clone(),
        });
        self.save_as_answers.pop_front().flatten()
    }

    fn resolve_save_conflict(&mut self, conflict: &SaveConflict<'_>) -> SaveConflictChoice {
        self.asked.push(PromptRecord::SaveConflict {
            path: conflict.path.clone(),
        });
        self.save_answers.pop_front().unwrap_or(self.default_save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_answers_come_before_defaults() {
        let mut prompter = ScriptedPrompter::new().answer_overwrite(false);
        let path = NormalizedPath::new("/tmp/x.groovy");

        assert!(!prompter.confirm_overwrite(&path));
        assert!(prompter.confirm_overwrite(&path));
        assert_eq!(prompter.asked().len(), 2);
    }
}
