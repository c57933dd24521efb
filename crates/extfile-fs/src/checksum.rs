//! Content digests
//!
//! Digests are rendered as `sha256:<hex>` so status reports can show which
//! revision of an external file was seen.

use sha2::{Digest, Sha256};

use crate::{Error, NormalizedPath, Result};

const PREFIX: &str = "sha256:";

fn render(bytes: &[u8]) -> String {
    format!("{PREFIX}{:x}", Sha256::digest(bytes))
}

/// Digest of in-memory holder content.
pub fn compute_content_checksum(content: &str) -> String {
    render(content.as_bytes())
}

/// Digest of the raw bytes of an external file.
pub fn compute_file_checksum(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let bytes = std::fs::read(&native).map_err(|e| Error::io(native, e))?;
    Ok(render(&bytes))
}
