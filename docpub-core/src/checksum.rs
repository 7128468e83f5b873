//! Content fingerprints for change detection.
//!
//! A checksum is the first eight bytes (big-endian) of the SHA-256 digest of
//! the content with CRLF normalised to LF.

use std::io::ErrorKind;
use std::path::Path;

use sha2::{Digest, Sha256};

pub fn checksum_bytes(content: &[u8]) -> u64 {
    let mut hasher = Sha256::new();
    let mut rest = content;
    while let Some(pos) = rest.windows(2).position(|w| w == b"\r\n") {
        hasher.update(&rest[..pos]);
        hasher.update(b"\n");
        rest = &rest[pos + 2..];
    }
    hasher.update(rest);
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Checksum of the file at `path`, or `None` when the file does not exist.
pub fn checksum_file(path: &Path) -> std::io::Result<Option<u64>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(checksum_bytes(&bytes))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}
