//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use unicode_normalization::UnicodeNormalization;

use crate::{Error, NormalizedPath, Result};

/// Modification time of a file or in-memory edit.
pub type Timestamp = DateTime<Utc>;

const UTF8_BOM: &str = "\u{feff}";

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    Ok(())
}

/// Read text content from a file.
///
/// Strips a UTF-8 byte order mark and decodes invalid UTF-8 lossily.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    let bytes = fs::read(&native_path).map_err(|e| Error::io(&native_path, e))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path, "File is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Last modification time of a file, if it exists.
pub fn modified(path: &NormalizedPath) -> Option<Timestamp> {
    fs::metadata(path.to_native())
        .and_then(|meta| meta.modified())
        .ok()
        .map(Timestamp::from)
}

/// Find the on-disk spelling of `path`.
///
/// Tries the literal path, then its Unicode NFC and NFD forms, since some
/// filesystems store composed and decomposed accents differently.
pub fn locate(path: &NormalizedPath) -> Option<NormalizedPath> {
    normalization_candidates(path)
        .into_iter()
        .find(NormalizedPath::is_file)
}

/// Literal, NFC and NFD spellings of a path, without duplicates.
pub fn normalization_candidates(path: &NormalizedPath) -> Vec<NormalizedPath> {
    let mut candidates = vec![path.clone()];
    for form in [
        path.as_str().nfc().collect::<String>(),
        path.as_str().nfd().collect::<String>(),
    ] {
        let candidate = NormalizedPath::new(form);
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Convert CRLF and lone CR line breaks to the platform separator.
pub fn normalize_line_breaks(content: &str) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    if cfg!(windows) {
        unified.replace('\n', "\r\n")
    } else {
        unified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_include_both_normal_forms() {
        // "é" precomposed
        let path = NormalizedPath::new("/tmp/caf\u{e9}.groovy");
        let candidates = normalization_candidates(&path);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].as_str(), "/tmp/cafe\u{301}.groovy");
    }

    #[test]
    fn ascii_path_has_single_candidate() {
        let path = NormalizedPath::new("/tmp/plain.groovy");
        assert_eq!(normalization_candidates(&path).len(), 1);
    }

    #[cfg(not(windows))]
    #[test]
    fn line_breaks_unified() {
        assert_eq!(normalize_line_breaks("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
