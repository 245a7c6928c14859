//! In-memory archives and config files for tests.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Builds a `.tar.gz` containing `entries` as `(path, content)` pairs, each mode `0o755`.
///
/// # Panics
///
/// Panics if the archive cannot be assembled, which only happens for invalid entry paths.
pub fn tarball(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to add {path} to test tarball: {e}"));
    }
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .unwrap_or_else(|e| panic!("Failed to finish test tarball: {e}"))
}

/// Lowercase hex SHA-256 of `content`.
pub fn sha256_hex(content: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(content.as_ref()))
}

/// A config file written into a test directory, with the archives it refers to served from
/// `file://` URLs.
#[derive(Debug, Clone)]
pub struct ConfigFixture {
    /// Directory holding the config, its archives and (by default) its cache and bin dirs
    pub dir: PathBuf,
    /// The config file
    pub path: PathBuf,
}

impl ConfigFixture {
    /// Writes a tarball with `bin/foo` into `dir` and a config installing it as `foo`, with its
    /// checksum recorded.
    pub fn foo(dir: &Path) -> Result<Self> {
        let archive = tarball(&[("bin/foo", "#!/bin/sh\necho foo\n")]);
        let archive_path = dir.join("foo.tar.gz");
        fs::write(&archive_path, &archive)
            .with_context(|| format!("Failed to write {}", archive_path.display()))?;
        let url = format!("file://{}", archive_path.display());

        let content = format!(
            "dependencies:\n  foo:\n    url: \"{url}\"\n    archive_path: bin/foo\nurl_checksums:\n  \"{url}\": {}\n",
            sha256_hex(&archive)
        );
        Self::with_content(dir, &content)
    }

    /// Writes `content` as `bindep.yaml` in `dir`.
    pub fn with_content(dir: &Path, content: &str) -> Result<Self> {
        let path = dir.join("bindep.yaml");
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            path,
        })
    }

    /// The `file://` URL of a file in the fixture directory.
    pub fn url(&self, file_name: &str) -> String {
        format!("file://{}", self.dir.join(file_name).display())
    }
}
