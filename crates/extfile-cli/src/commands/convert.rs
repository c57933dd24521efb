//! Convert command implementation

use std::path::Path;

use colored::Colorize;
use extfile_core::{ComposeComponent, ComposeSelectors, NamingMode, ProjectSaveCoordinator};

use crate::commands::sync::report;
use crate::context::{GlobalOptions, ProjectContext};
use crate::error::{CliError, Result};

/// Parse `--compose` names into selectors.
fn parse_selectors(names: &[String]) -> Result<ComposeSelectors> {
    let mut selectors = ComposeSelectors::default();
    for name in names {
        let component: ComposeComponent = name.parse()?;
        selectors.set(component, true);
    }
    Ok(selectors)
}

/// Run the convert command
///
/// Changes the naming mode of one holder and saves the project, writing the
/// holder's content to its new file.
pub fn run_convert(
    path: &Path,
    holder: &str,
    mode: &str,
    manual_path: Option<&str>,
    compose: &[String],
    options: &GlobalOptions,
) -> Result<()> {
    let mode: NamingMode = mode.parse()?;
    let selectors = parse_selectors(compose)?;
    if mode == NamingMode::Manual && manual_path.is_none() {
        return Err(CliError::user("Manual mode needs --path"));
    }
    if mode == NamingMode::Composed && compose.is_empty() {
        return Err(CliError::user(
            "Composed mode needs --compose, e.g. --compose project,case,step",
        ));
    }

    println!(
        "{} Converting {} to {}...",
        "=>".blue().bold(),
        holder.cyan(),
        mode.as_str().cyan()
    );

    let mut ctx = ProjectContext::open_loaded(path, options)?;
    let target = ctx.project.with_holder_mut(holder, |position, engine| {
        match (mode, manual_path) {
            (NamingMode::Manual, Some(manual)) => engine.set_manual_path(manual),
            (NamingMode::Composed, _) => {
                engine.set_naming_mode(NamingMode::Composed);
                engine.set_compose_selectors(selectors);
            }
            (mode, _) => engine.set_naming_mode(mode),
        }
        engine.target_path(position)
    })?;
    match target {
        Some(target) => println!("   {} {}", "->".green(), target),
        None => println!("   {} content stays inline", "->".green()),
    }

    let summary = ProjectSaveCoordinator::save(&mut ctx.project, &mut ctx.session)?;
    report(&summary)
}
