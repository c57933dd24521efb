//! [`TestProject`] temp directory for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use crate::xml::ProjectXml;

/// Project file name used by [`TestProject::write_project`].
pub const PROJECT_FILE: &str = "demo-soapui-project.xml";

/// Resource directory belonging to [`PROJECT_FILE`].
pub const RESOURCE_DIR: &str = "demo-soapui-project-resources";

/// A temporary directory holding one project file and its resources.
///
/// # Example
///
/// ```rust,no_run
/// use extfile_test_utils::{ProjectXml, TestProject};
///
/// let project = TestProject::new();
/// project.write_project(&ProjectXml::new("P"));
/// project.write_resource("P/S-setupScript.groovy", "log.info 'hi'");
/// project.assert_resource_exists("P/S-setupScript.groovy");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn project_path(&self) -> PathBuf {
        self.root().join(PROJECT_FILE)
    }

    pub fn resource_root(&self) -> PathBuf {
        self.root().join(RESOURCE_DIR)
    }

    /// Write the project document and return its path.
    pub fn write_project(&self, project: &ProjectXml) -> PathBuf {
        let path = self.project_path();
        fs::write(&path, project.render()).unwrap();
        path
    }

    pub fn read_project(&self) -> String {
        fs::read_to_string(self.project_path())
            .unwrap_or_else(|_| panic!("Could not read {}", self.project_path().display()))
    }

    /// Write a file relative to the resource root, creating parents.
    pub fn write_resource(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.resource_root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read_resource(&self, rel: &str) -> String {
        let path = self.resource_root().join(rel);
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("Could not read {}", path.display()))
    }

    /// Set a resource's modification time.
    pub fn set_resource_mtime(&self, rel: &str, time: SystemTime) {
        let path = self.resource_root().join(rel);
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(time).unwrap();
    }

    /// Push a resource's modification time `secs` seconds into the future.
    pub fn advance_resource_mtime(&self, rel: &str, secs: u64) {
        self.set_resource_mtime(rel, SystemTime::now() + Duration::from_secs(secs));
    }

    /// Modification time of a resource.
    pub fn resource_mtime(&self, rel: &str) -> SystemTime {
        fs::metadata(self.resource_root().join(rel))
            .and_then(|meta| meta.modified())
            .unwrap()
    }

    /// # Panics
    /// Panics with a descriptive message if the resource does not exist.
    pub fn assert_resource_exists(&self, rel: &str) {
        let path = self.resource_root().join(rel);
        assert!(path.exists(), "Expected resource to exist: {}", path.display());
    }

    /// # Panics
    /// Panics with a descriptive message if the resource exists.
    pub fn assert_resource_not_exists(&self, rel: &str) {
        let path = self.resource_root().join(rel);
        assert!(!path.exists(), "Expected resource NOT to exist: {}", path.display());
    }

    /// Assert the resource file holds exactly `expected`.
    pub fn assert_resource_content(&self, rel: &str, expected: &str) {
        let actual = self.read_resource(rel);
        assert_eq!(actual, expected, "Unexpected content in resource {rel}");
    }
}
