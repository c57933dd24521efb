//! Error types for extfile-core

/// Result type for extfile-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in extfile-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A content holder has no underlying XML configuration
    #[error("Configuration missing for {holder}")]
    ConfigMissing { holder: String },

    /// Malformed or unserializable XML
    #[error("XML error: {message}")]
    Xml { message: String },

    /// Unknown `externalFilenameBuildMode` value
    #[error("Invalid naming mode: {value}")]
    InvalidNamingMode { value: String },

    /// Unknown compose selector name
    #[error("Invalid compose component: {value} (expected project, suite, case or step)")]
    InvalidComposeComponent { value: String },

    /// The project root cannot be removed from its own document
    #[error("The project itself cannot be removed")]
    CannotRemoveProject,

    /// Document does not have the expected project structure
    #[error("Invalid project document: {message}")]
    InvalidProject { message: String },

    /// The project has never been saved to a file
    #[error("Project has no file path; use save-as")]
    NoProjectPath,

    /// No node matches a holder or node label
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filesystem error from extfile-fs
    #[error(transparent)]
    Fs(#[from] extfile_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }
}
