//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A path normalized to use forward slashes internally.
///
/// Backslashes become forward slashes, repeated separators collapse and
/// `.`/`..` segments are resolved lexically. A leading `//` (network path)
/// is preserved. Conversion to the platform format happens only at I/O
/// boundaries via [`NormalizedPath::to_native`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a relative segment.
    ///
    /// The result is cleaned, so `..` in `segment` can climb above `self`;
    /// callers that need containment check with [`NormalizedPath::starts_with`].
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if segment_normalized.is_empty() {
            return self.clone();
        }
        let joined = if self.inner.is_empty() {
            segment_normalized
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Replace the extension (including the dot) with `suffix`.
    ///
    /// `project.xml` with suffix `-resources` becomes `project-resources`.
    /// Paths without an extension get the suffix appended.
    pub fn with_extension_replaced(&self, suffix: &str) -> Self {
        let stem_len = match self.extension() {
            Some(ext) => self.inner.len() - ext.len() - 1,
            None => self.inner.trim_end_matches('/').len(),
        };
        Self {
            inner: format!("{}{}", &self.inner[..stem_len], suffix),
        }
    }

    /// True when the path is absolute on any supported platform.
    ///
    /// Recognizes a leading separator, a Windows drive prefix (`C:/`) and
    /// network paths.
    pub fn is_absolute(&self) -> bool {
        is_absolute_str(&self.inner)
    }

    /// Check if this path lies at or below `base`, segment-wise.
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        if base.inner.is_empty() || self.inner == base.inner {
            return true;
        }
        let prefix = if base.inner.ends_with('/') {
            base.inner.clone()
        } else {
            format!("{}/", base.inner)
        };
        self.inner.starts_with(&prefix)
    }

    /// Path of `self` relative to `base`, if `self` lies below it.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<&str> {
        if !self.starts_with(base) {
            return None;
        }
        Some(
            self.inner[base.inner.len().min(self.inner.len())..].trim_start_matches('/'),
        )
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Check if this appears to be a network path.
    ///
    /// Detects UNC paths (//server/share) and URL-like shares.
    pub fn is_network_path(&self) -> bool {
        self.inner.starts_with("//")
            || self.inner.starts_with("smb:/")
            || self.inner.starts_with("nfs:/")
    }
}

/// True when `path` is absolute on any supported platform.
pub fn is_absolute_str(path: &str) -> bool {
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

/// Lexically clean a forward-slash path.
fn clean(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let (prefix, rest) = if path.starts_with("//") && !path.starts_with("///") {
        ("//", &path[2..])
    } else if path.starts_with('/') {
        ("/", path.trim_start_matches('/'))
    } else {
        ("", path)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if prefix.is_empty() {
                    segments.push("..");
                }
                // `..` at an absolute root stays at the root
            }
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    if body.is_empty() {
        if prefix.is_empty() {
            ".".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{prefix}{body}")
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
