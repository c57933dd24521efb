//! extfile CLI
//!
//! Command-line interface for keeping project content in external files.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use context::GlobalOptions;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("{}: {}", "warning".yellow().bold(), e);
        }
        tracing::debug!("Verbose mode enabled");
    }

    let options = GlobalOptions {
        settings: cli.settings,
        yes: cli.yes,
    };

    match cli.command {
        Some(cmd) => execute_command(cmd, &options),
        None => {
            println!("{} external content for project files", "extfile".green().bold());
            println!();
            println!("Run {} for available commands.", "extfile --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, options: &GlobalOptions) -> Result<()> {
    match cmd {
        Commands::Status { project, json } => commands::run_status(&project, options, json),
        Commands::Sync { project } => commands::run_sync(&project, options),
        Commands::Export { project, output } => {
            commands::run_export(&project, output.as_deref(), options)
        }
        Commands::Rename {
            project,
            node,
            new_name,
        } => commands::run_rename(&project, &node, &new_name, options),
        Commands::Convert {
            project,
            holder,
            mode,
            path,
            compose,
        } => commands::run_convert(&project, &holder, &mode, path.as_deref(), &compose, options),
        Commands::Remove { project, node } => commands::run_remove(&project, &node, options),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "extfile", &mut std::io::stdout());
            Ok(())
        }
    }
}
