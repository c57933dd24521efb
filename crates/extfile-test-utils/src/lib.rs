//! Shared test utilities for the extfile workspace.
//!
//! This crate provides project fixtures to avoid hand-written XML in every
//! test suite. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`xml`]: builders for project documents
//! - [`project`]: [`TestProject`] temp directory with project and resource files

pub mod project;
pub mod xml;

pub use project::TestProject;
pub use xml::{CaseXml, ProjectXml, SuiteXml, script_assertion};
