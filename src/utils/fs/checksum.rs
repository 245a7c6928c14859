//! SHA-256 checksums of downloads, extracted trees and cache keys.
//!
//! All checksums are lowercase hex without an algorithm prefix, matching the values stored in
//! a config's `url_checksums`.
//!
//! # Directory checksums
//!
//! [`dir_checksum`] hashes every entry below a directory in sorted order. Each entry
//! contributes a kind tag (`d`, `f` or `l`) and its length-prefixed `/`-separated relative
//! path, followed for regular files by the length-prefixed content with `\r\n` normalized to
//! `\n`, and for symlinks by the length-prefixed link target. The result is stable across
//! platforms and checkouts with different line-ending settings.

use crate::constants::CACHE_KEY_LEN;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Computes the SHA-256 of a file's content.
///
/// # Examples
///
/// ```rust,no_run
/// use bindep::utils::fs::file_sha256;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let sum = file_sha256(Path::new("foo.tar.gz"))?;
/// assert_eq!(sum.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file for checksum: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Computes the checksum of a directory tree.
pub fn dir_checksum(dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(dir).min_depth(1).follow_links(false).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", dir.display()))?;
        let relative = entry.path().strip_prefix(dir).with_context(|| {
            format!("{} is not below {}", entry.path().display(), dir.display())
        })?;
        let relative: Vec<_> =
            relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
        let relative = relative.join("/");

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            let target = fs::read_link(entry.path()).with_context(|| {
                format!("Failed to read symlink: {}", entry.path().display())
            })?;
            hasher.update(b"l");
            update_field(&mut hasher, relative.as_bytes());
            update_field(&mut hasher, target.to_string_lossy().as_bytes());
        } else if file_type.is_file() {
            let content = fs::read(entry.path())
                .with_context(|| format!("Failed to read file: {}", entry.path().display()))?;
            hasher.update(b"f");
            update_field(&mut hasher, relative.as_bytes());
            update_field(&mut hasher, &normalize_line_endings(&content));
        } else {
            hasher.update(b"d");
            update_field(&mut hasher, relative.as_bytes());
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Derives a cache key from a checksum: the first hex characters of its SHA-256.
///
/// The result is always a valid cache key, whatever the checksum contains.
pub fn cache_key(checksum: &str) -> String {
    let mut key = hex::encode(Sha256::digest(checksum.as_bytes()));
    key.truncate(CACHE_KEY_LEN);
    key
}

/// Hashes a field as its little-endian `u64` length followed by its bytes.
fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn normalize_line_endings(content: &[u8]) -> Vec<u8> {
    let mut normalized = Vec::with_capacity(content.len());
    let mut bytes = content.iter().peekable();
    while let Some(&byte) = bytes.next() {
        if byte == b'\r' && bytes.peek() == Some(&&b'\n') {
            continue;
        }
        normalized.push(byte);
    }
    normalized
}
