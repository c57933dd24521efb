//! Sync and export command implementations

use std::path::Path;

use colored::Colorize;
use extfile_core::{ProjectSaveCoordinator, SaveSummary};
use extfile_fs::NormalizedPath;

use crate::context::{GlobalOptions, ProjectContext};
use crate::error::{CliError, Result};

/// Run the sync command
///
/// Loads every holder, writes changed content to external files and saves
/// the project document.
pub fn run_sync(path: &Path, options: &GlobalOptions) -> Result<()> {
    println!("{} Synchronizing {}...", "=>".blue().bold(), path.display());

    let mut ctx = ProjectContext::open_loaded(path, options)?;
    let summary = ProjectSaveCoordinator::save(&mut ctx.project, &mut ctx.session)?;
    report(&summary)
}

/// Run the export command
///
/// Writes the project with every holder's content inline, over the project
/// itself or to `output`.
pub fn run_export(path: &Path, output: Option<&Path>, options: &GlobalOptions) -> Result<()> {
    println!("{} Exporting {}...", "=>".blue().bold(), path.display());

    let mut ctx = ProjectContext::open_loaded(path, options)?;
    let summary = match output {
        Some(target) => ProjectSaveCoordinator::save_as_including_externalized(
            &mut ctx.project,
            &mut ctx.session,
            &NormalizedPath::new(target),
        )?,
        None => ProjectSaveCoordinator::save_including_externalized(
            &mut ctx.project,
            &mut ctx.session,
        )?,
    };
    report(&summary)
}

/// Print a save summary; failed holders turn into an error.
pub fn report(summary: &SaveSummary) -> Result<()> {
    for label in &summary.converted {
        println!("   {} {} (now external)", "+".green(), label.cyan());
    }
    for label in &summary.saved {
        println!("   {} {}", "~".green(), label);
    }
    for label in &summary.reloaded {
        println!("   {} {} (reloaded from file)", "<".yellow(), label);
    }
    for label in &summary.failed {
        println!("   {} {} (kept inline)", "!".red(), label);
    }
    for message in &summary.commit_errors {
        println!("   {} {}", "!".red(), message);
    }

    if let Some(file) = &summary.project_file {
        println!("{} Wrote {}", "OK".green().bold(), file);
    }

    if summary.is_success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} holder(s) could not be saved",
            summary.failed.len() + summary.commit_errors.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extfile_test_utils::{CaseXml, ProjectXml, SuiteXml, TestProject};

    fn options() -> GlobalOptions {
        GlobalOptions {
            settings: None,
            yes: true,
        }
    }

    fn project() -> ProjectXml {
        ProjectXml::new("P").suite(SuiteXml::new("S").case(CaseXml::new("C").groovy_step(
            "G",
            "log.info 1",
            &[("externalFilenameBuildMode", "AUTO")],
        )))
    }

    #[test]
    fn sync_externalizes_content() {
        let tp = TestProject::new();
        let path = tp.write_project(&project());

        run_sync(&path, &options()).unwrap();

        tp.assert_resource_content("P/S/C/G.groovy", "log.info 1");
        assert!(!tp.read_project().contains("log.info 1"));
    }

    #[test]
    fn export_to_output_leaves_project_alone() {
        let tp = TestProject::new();
        let path = tp.write_project(&project());
        run_sync(&path, &options()).unwrap();
        let output = tp.root().join("shared.xml");

        run_export(&path, Some(&output), &options()).unwrap();

        assert!(std::fs::read_to_string(&output).unwrap().contains("log.info 1"));
        assert!(!tp.read_project().contains("log.info 1"));
    }

    #[test]
    fn failed_holders_are_an_error() {
        let summary = SaveSummary {
            failed: vec!["P/S/C/G".to_string()],
            ..SaveSummary::default()
        };
        assert!(matches!(report(&summary), Err(CliError::User { .. })));
    }
}
