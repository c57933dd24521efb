//! Constants and enums for external content file names.

use std::path::Path;

/// Default suffix that replaces the project file extension to form the
/// external content root (`demo-soapui-project.xml` -> `demo-soapui-project-resources`).
pub const DEFAULT_RESOURCE_DIR_SUFFIX: &str = "-resources";

/// File name suffixes used for externalized content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentSuffix {
    /// Request bodies (`-request.xml`)
    Request,
    /// Groovy scripts (`.groovy`)
    Script,
}

impl ContentSuffix {
    /// Get the string representation of the suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "-request.xml",
            Self::Script => ".groovy",
        }
    }

    /// Detect the suffix of an existing file name.
    pub fn detect(file_name: &str) -> Option<Self> {
        if file_name.ends_with(Self::Request.as_str()) {
            Some(Self::Request)
        } else if file_name.ends_with(Self::Script.as_str()) {
            Some(Self::Script)
        } else {
            None
        }
    }
}

impl AsRef<str> for ContentSuffix {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<Path> for ContentSuffix {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for ContentSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
