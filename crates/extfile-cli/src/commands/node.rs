//! Rename and remove command implementations

use std::path::Path;

use colored::Colorize;
use extfile_core::ProjectSaveCoordinator;

use crate::commands::sync::report;
use crate::context::{GlobalOptions, ProjectContext};
use crate::error::Result;

/// Run the rename command
///
/// Renames the node, moves the files of derived-mode holders beneath it and
/// saves the project.
pub fn run_rename(path: &Path, node: &str, new_name: &str, options: &GlobalOptions) -> Result<()> {
    println!(
        "{} Renaming {} to {}...",
        "=>".blue().bold(),
        node.cyan(),
        new_name.cyan()
    );

    let mut ctx = ProjectContext::open_loaded(path, options)?;
    let outcomes = ctx.project.rename_node(node, new_name, &mut ctx.session)?;
    let root = ctx.session.store().root().clone();
    for outcome in &outcomes {
        let from = outcome.old_path.strip_prefix(&root).unwrap_or(outcome.old_path.as_str());
        let to = outcome.new_path.strip_prefix(&root).unwrap_or(outcome.new_path.as_str());
        if outcome.moved {
            println!("   {} {} -> {}", "~".green(), from, to.cyan());
        } else {
            println!("   {} {} (not moved)", "-".yellow(), from.dimmed());
        }
    }

    let summary = ProjectSaveCoordinator::save(&mut ctx.project, &mut ctx.session)?;
    report(&summary)
}

/// Run the remove command
pub fn run_remove(path: &Path, node: &str, options: &GlobalOptions) -> Result<()> {
    println!("{} Removing {}...", "=>".blue().bold(), node.cyan());

    let mut ctx = ProjectContext::open_loaded(path, options)?;
    let deleted = ctx.project.remove_node(node, &mut ctx.session)?;
    for label in &deleted {
        println!("   {} {}", "-".red(), label);
    }

    let summary = ProjectSaveCoordinator::save(&mut ctx.project, &mut ctx.session)?;
    report(&summary)
}
