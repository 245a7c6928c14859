//! Shared helpers for the integration tests.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use bindep::test_utils::{ConfigFixture, sha256_hex, tarball};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The default script packed into test archives.
pub const FOO_SCRIPT: &str = "#!/bin/sh\necho foo\n";

/// A temporary project directory with a config file and local archives.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    /// An empty project.
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new().context("Failed to create test project")?,
        })
    }

    /// A project with `foo` configured: `foo.tar.gz` holding `bin/foo`, checksum recorded.
    pub fn with_foo() -> Result<Self> {
        let project = Self::new()?;
        ConfigFixture::foo(project.dir())?;
        Ok(project)
    }

    /// The project directory.
    pub fn dir(&self) -> &Path {
        self.temp.path()
    }

    /// The project's config file.
    pub fn config_path(&self) -> PathBuf {
        self.dir().join("bindep.yaml")
    }

    /// Writes a tarball with `entries` as `file_name` and returns its URL and checksum.
    pub fn add_archive(&self, file_name: &str, entries: &[(&str, &str)]) -> Result<(String, String)> {
        let archive = tarball(entries);
        let path = self.dir().join(file_name);
        fs::write(&path, &archive).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok((format!("file://{}", path.display()), sha256_hex(&archive)))
    }

    /// Writes `content` as the config file.
    pub fn write_config(&self, content: &str) -> Result<()> {
        ConfigFixture::with_content(self.dir(), content)?;
        Ok(())
    }

    /// The config file's current content.
    pub fn read_config(&self) -> Result<String> {
        fs::read_to_string(self.config_path()).context("Failed to read config")
    }

    /// A path in the default install directory.
    pub fn bin(&self, name: &str) -> PathBuf {
        self.dir().join("bin").join(name)
    }

    /// The default cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.dir().join(".bindep")
    }

    /// A `bindep` command running in the project directory with a clean environment.
    pub fn bindep(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bindep"));
        cmd.current_dir(self.dir())
            .env_remove("BINDEP_CONFIG")
            .env_remove("BINDEP_CACHE")
            .env_remove("BINDEP_TRUST_CACHE")
            .env_remove("RUST_LOG")
            .env("BINDEP_NO_PROGRESS", "true")
            .env("NO_COLOR", "1");
        cmd
    }
}

/// Entries of `dir` other than the `.locks` directory.
pub fn entries_without_locks(dir: &Path) -> Vec<String> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = read
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name != ".locks")
        .collect();
    names.sort();
    names
}

/// True when the file at `path` has any execute bit set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}
