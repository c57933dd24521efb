//! Filesystem layer for externalized project content
//!
//! Provides normalized path handling, safe text I/O and the
//! [`ExternalFileStore`] that mirrors project content on disk.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod layout;
pub mod path;
pub mod store;

pub use config::ConfigStore;
pub use constants::ContentSuffix;
pub use error::{Error, Result};
pub use io::Timestamp;
pub use layout::ResourceLayout;
pub use path::NormalizedPath;
pub use store::{ExternalFileStore, StoredContent, WriteMode, WriteOutcome};
