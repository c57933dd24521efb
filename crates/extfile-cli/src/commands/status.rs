//! Status command implementation

use std::path::Path;

use colored::{ColoredString, Colorize};
use extfile_core::{HolderState, HolderStatus, StatusReport};
use extfile_fs::NormalizedPath;

use crate::context::{GlobalOptions, ProjectContext};
use crate::error::Result;

/// Run the status command
///
/// Reads files but never writes them.
pub fn run_status(path: &Path, options: &GlobalOptions, json: bool) -> Result<()> {
    let ctx = ProjectContext::open(path, options)?;
    let root = ctx.session.store().root().clone();
    let report = StatusReport::collect(&ctx.project, ctx.session.store());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "Project".bold(), ctx.project.name().cyan());
    println!("{}: {}", "Resources".dimmed(), root);
    println!();

    if report.holders.is_empty() {
        println!("  {}", "No content holders".dimmed());
        return Ok(());
    }

    let width = report
        .holders
        .iter()
        .map(|h| h.label.chars().count())
        .max()
        .unwrap_or(0);
    for holder in &report.holders {
        println!(
            "  {:<width$}  {:<9} {:<10} {}",
            holder.label,
            holder.mode.as_deref().unwrap_or("-"),
            paint(holder.state),
            display_path(holder, &root).dimmed(),
        );
    }

    println!();
    if report.is_clean() {
        println!("{} Everything in sync", "OK".green().bold());
    } else {
        println!(
            "{} modified, {} diverged, {} missing. Run {} to write changes.",
            report.count(HolderState::Modified),
            report.count(HolderState::Diverged),
            report.count(HolderState::Missing),
            "extfile sync".cyan()
        );
    }
    Ok(())
}

fn paint(state: HolderState) -> ColoredString {
    match state {
        HolderState::Inline => state.as_str().dimmed(),
        HolderState::InSync => state.as_str().green(),
        HolderState::Modified => state.as_str().yellow(),
        HolderState::Diverged => state.as_str().red(),
        HolderState::Missing => state.as_str().red().bold(),
    }
}

fn display_path(holder: &HolderStatus, root: &NormalizedPath) -> String {
    let Some(path) = &holder.path else {
        return String::new();
    };
    NormalizedPath::new(path)
        .strip_prefix(root)
        .map(str::to_string)
        .unwrap_or_else(|| path.clone())
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

    #[test]
    fn status_of_fresh_project() {
        let tp = TestProject::new();
        let path = tp.write_project(&ProjectXml::new("P").suite(
            SuiteXml::new("S").case(CaseXml::new("C").groovy_step(
                "G",
                "log.info 1",
                &[("externalFilenameBuildMode", "AUTO")],
            )),
        ));

        assert!(run_status(&path, &options(), false).is_ok());
        assert!(run_status(&path, &options(), true).is_ok());
        tp.assert_resource_not_exists("P/S/C/G.groovy");
    }

    #[test]
    fn relative_display_path() {
        let holder = HolderStatus {
            label: "P/S/C/G".to_string(),
            mode: Some("AUTO".to_string()),
            path: Some("/tmp/p-resources/P/S/C/G.groovy".to_string()),
            state: HolderState::Missing,
            checksum: None,
        };
        let root = NormalizedPath::new("/tmp/p-resources");
        assert_eq!(display_path(&holder, &root), "P/S/C/G.groovy");
    }
}
