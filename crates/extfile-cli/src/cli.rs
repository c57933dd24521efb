//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// extfile - Keep project scripts and requests in external files
#[derive(Parser, Debug)]
#[command(name = "extfile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (TOML, JSON or YAML); defaults to extfile.toml next to the project
    #[arg(long, global = true, env = "EXTFILE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Never prompt: keep project content on load conflicts and confirm overwrites
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the synchronization state of every content holder
    Status {
        /// Project file
        project: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Load external files and save the project
    ///
    /// Missing files are created from inline content; changed holders are
    /// written back to their files.
    Sync {
        /// Project file
        project: PathBuf,
    },

    /// Save the project with all external content written inline
    ///
    /// Examples:
    ///   extfile export demo-soapui-project.xml
    ///   extfile export demo-soapui-project.xml --output shared.xml
    Export {
        /// Project file
        project: PathBuf,

        /// Write the self-contained copy here instead of over the project
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rename the project, a suite, case, step or assertion and move its files
    ///
    /// Nodes are addressed relative to the project, e.g. `Suite/Case/Step`;
    /// `/` is the project itself.
    Rename {
        /// Project file
        project: PathBuf,

        /// Node path
        node: String,

        /// New name
        new_name: String,
    },

    /// Change how a holder names its external file
    ///
    /// Holders are addressed by label, e.g. `Project/Suite/Case/Step` or
    /// `Project/Suite#setupScript`.
    ///
    /// Examples:
    ///   extfile convert p.xml P/S/C/T --mode auto
    ///   extfile convert p.xml P/S/C/T --mode manual --path shared/login.xml
    ///   extfile convert p.xml P/S/C/T --mode composed --compose project,step
    Convert {
        /// Project file
        project: PathBuf,

        /// Holder label
        holder: String,

        /// Naming mode: none, manual, auto or composed
        #[arg(short, long)]
        mode: String,

        /// File path for manual mode
        #[arg(short, long)]
        path: Option<String>,

        /// Names used by composed mode
        #[arg(short, long, value_delimiter = ',')]
        compose: Vec<String>,
    },

    /// Remove a suite, case, step or assertion and delete its files
    Remove {
        /// Project file
        project: PathBuf,

        /// Node path
        node: String,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   extfile completions bash > ~/.local/share/bash-completion/completions/extfile
    ///   extfile completions zsh > ~/.zfunc/_extfile
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
