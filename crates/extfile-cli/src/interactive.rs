//! Interactive conflict prompts
//!
//! Uses dialoguer for terminal-based selection. A prompt that cannot be shown
//! (no terminal, interrupted input) keeps the in-memory side and never
//! confirms an overwrite.

use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use extfile_core::{
    ConflictPrompter, LoadConflict, LoadConflictChoice, SaveConflict, SaveConflictChoice,
};
use extfile_fs::NormalizedPath;

const LOAD_CHOICES: &[(&str, LoadConflictChoice)] = &[
    ("Use project content", LoadConflictChoice::UseProject),
    ("Use project content for all", LoadConflictChoice::UseProjectAlways),
    ("Reload external file", LoadConflictChoice::ReloadExternal),
    ("Reload external files for all", LoadConflictChoice::ReloadExternalAlways),
];

const SAVE_CHOICES: &[(&str, SaveConflictChoice)] = &[
    ("Overwrite the file with current content", SaveConflictChoice::OverwriteWithMemory),
    ("Discard changes and reload the file", SaveConflictChoice::DiscardAndReload),
];

/// Terminal prompter.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn preview(content: &str) -> String {
    let first = content.lines().next().unwrap_or_default();
    let lines = content.lines().count();
    if lines > 1 {
        format!("{first} ... ({lines} lines)")
    } else {
        first.to_string()
    }
}

impl ConflictPrompter for DialoguerPrompter {
    fn resolve_load_conflict(&mut self, conflict: &LoadConflict<'_>) -> LoadConflictChoice {
        println!();
        println!(
            "{} Project and external file differ: {}",
            "!".yellow().bold(),
            conflict.path.as_str().cyan()
        );
        println!("  {}: {}", "project".dimmed(), preview(conflict.project_content));
        println!("  {}: {}", "file".dimmed(), preview(conflict.external_content));

        let labels: Vec<&str> = LOAD_CHOICES.iter().map(|(label, _)| *label).collect();
        match Select::new()
            .with_prompt("Which content should be kept?")
            .items(&labels)
            .default(0)
            .interact()
        {
            Ok(idx) => LOAD_CHOICES[idx].1,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, keeping project content");
                LoadConflictChoice::UseProject
            }
        }
    }

    fn confirm_overwrite(&mut self, path: &NormalizedPath) -> bool {
        Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", path.as_str()))
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Prompt failed, not overwriting");
                false
            })
    }

    fn choose_save_as(&mut self, suggested: &NormalizedPath) -> Option<String> {
        let answer: Result<String, _> = Input::new()
            .with_prompt("Save to another file (empty to cancel)")
            .with_initial_text(suggested.as_str())
            .allow_empty(true)
            .interact_text();
        match answer {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(path.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, save cancelled");
                None
            }
        }
    }

    fn resolve_save_conflict(&mut self, conflict: &SaveConflict<'_>) -> SaveConflictChoice {
        println!();
        println!(
            "{} {} changed on disk since it was loaded",
            "!".yellow().bold(),
            conflict.path.as_str().cyan()
        );
        let labels: Vec<&str> = SAVE_CHOICES.iter().map(|(label, _)| *label).collect();
        match Select::new()
            .with_prompt("How should the conflict be resolved?")
            .items(&labels)
            .default(0)
            .interact()
        {
            Ok(idx) => SAVE_CHOICES[idx].1,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, keeping current content");
                SaveConflictChoice::OverwriteWithMemory
            }
        }
    }
}
