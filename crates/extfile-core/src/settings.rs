//! Feature settings
//!
//! Every key is optional; missing keys take their defaults. Settings files
//! may be TOML, JSON or YAML.

use extfile_fs::constants::DEFAULT_RESOURCE_DIR_SUFFIX;
use extfile_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Settings for external content handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master switch; when off nothing is written to external files
    pub content_in_external_file: bool,
    /// Externalize holders that carry no naming mode yet on save
    pub auto_convert: bool,
    /// Also keep externalized content inline in the project document
    pub keep_in_project: bool,
    /// Convert line breaks to the platform separator on every write
    pub normalize_line_breaks: bool,
    /// Replaces the project file extension to form the resource root
    pub resource_dir_suffix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            content_in_external_file: true,
            auto_convert: false,
            keep_in_project: false,
            normalize_line_breaks: false,
            resource_dir_suffix: DEFAULT_RESOURCE_DIR_SUFFIX.to_string(),
        }
    }
}

impl Settings {
    /// Load settings, using defaults when the file does not exist.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let settings = ConfigStore::new().load_or_default(path)?;
        tracing::debug!(path = %path, ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Write settings in the format implied by the file extension.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str("keep_in_project = true").unwrap();
        assert!(settings.keep_in_project);
        assert!(settings.content_in_external_file);
        assert_eq!(settings.resource_dir_suffix, "-resources");
    }
}
