//! Synchronization core for externalized project content
//!
//! This crate keeps the content of project holders (request bodies, Groovy
//! step scripts, script assertions and lifecycle scripts) in sync with
//! standalone files on disk:
//!
//! - **Naming**: derive file paths from a holder's tree position
//! - **Bindings**: read and write the synchronization attributes of each
//!   XML configuration shape
//! - **SyncEngine**: per-holder load, save, reload, rename and delete with
//!   timestamp-based conflict detection
//! - **Project model**: the typed project tree and project-wide save
//!
//! # Architecture
//!
//! ```text
//!               extfile-cli
//!                    |
//!              extfile-core
//!   project -> engine -> binding, naming
//!                    |
//!               extfile-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use extfile_core::{Project, ProjectSaveCoordinator, ProjectSession, ScriptedPrompter, Settings};
//!
//! fn sync(path: &std::path::Path) -> extfile_core::Result<()> {
//!     let mut session = ProjectSession::open(Settings::default(), Some(path), ScriptedPrompter::new())?;
//!     let mut project = Project::open(path)?;
//!     project.load_external(&mut session);
//!     ProjectSaveCoordinator::save(&mut project, &mut session)?;
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod naming;
pub mod project;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod status;
pub mod xml;

pub use binding::{BindingShape, ContentBinding};
pub use coordinator::{ProjectSaveCoordinator, SaveSummary};
pub use engine::{LoadStatus, RenameOutcome, SaveStatus, SyncEngine};
pub use error::{Error, Result};
pub use naming::{
    ComposeComponent, ComposeSelectors, ContentKind, NamingMode, PathBuilder, TreePosition,
    derive_path, sanitize_segment,
};
pub use project::{HolderEntry, NodeRef, Project};
pub use prompt::{
    ConflictPrompter, LoadConflict, LoadConflictChoice, PromptRecord, SaveConflict,
    SaveConflictChoice, ScriptedPrompter,
};
pub use session::{ConflictPolicy, ProjectSession, SyncContext};
pub use settings::Settings;
pub use status::{HolderState, HolderStatus, StatusReport};
pub use xml::{XmlDocument, XmlElement, XmlNode};
