//! Resource directory layout
//!
//! Maps a project file to the directory that holds its external content.

use std::path::Path;

use crate::constants::DEFAULT_RESOURCE_DIR_SUFFIX;
use crate::{Error, NormalizedPath, Result};

/// Where a project's external content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    /// The project file, if the project has been saved
    pub project_file: Option<NormalizedPath>,
    /// Root directory for external content files
    pub root: NormalizedPath,
}

impl ResourceLayout {
    /// Layout for a project stored at `project_file`.
    ///
    /// The root is the project path with its extension replaced by `suffix`.
    pub fn for_project(project_file: impl AsRef<Path>, suffix: &str) -> Self {
        let project_file = NormalizedPath::new(project_file);
        let root = project_file.with_extension_replaced(suffix);
        Self {
            project_file: Some(project_file),
            root,
        }
    }

    /// Layout for an unsaved project, rooted at the working directory.
    pub fn unsaved() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Ok(Self {
            project_file: None,
            root: NormalizedPath::new(cwd),
        })
    }

    /// Layout for `project_file` when given, otherwise [`ResourceLayout::unsaved`].
    ///
    /// Existing project files are canonicalized so relative invocations and
    /// symlinked checkouts resolve to one root.
    pub fn resolve(project_file: Option<&Path>, suffix: Option<&str>) -> Result<Self> {
        let suffix = suffix.unwrap_or(DEFAULT_RESOURCE_DIR_SUFFIX);
        match project_file {
            Some(path) if path.exists() => {
                let canonical = dunce::canonicalize(path).map_err(|e| Error::io(path, e))?;
                Ok(Self::for_project(canonical, suffix))
            }
            Some(path) => Ok(Self::for_project(path, suffix)),
            None => Self::unsaved(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_replaces_extension() {
        let layout = ResourceLayout::for_project("/work/demo-soapui-project.xml", "-resources");
        assert_eq!(layout.root.as_str(), "/work/demo-soapui-project-resources");
    }

    #[test]
    fn unsaved_uses_working_directory() {
        let layout = ResourceLayout::unsaved().unwrap();
        assert!(layout.project_file.is_none());
        assert_eq!(
            layout.root,
            NormalizedPath::new(std::env::current_dir().unwrap())
        );
    }
}
