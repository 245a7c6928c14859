//! Advisory file locks for cache roots and cache entries.
//!
//! Locks are OS-level shared/exclusive locks taken through [`fs4`]. Acquisition blocks the
//! calling thread until the lock is available; there is no timeout. A lock is released when
//! the [`CacheLock`] is dropped.
//!
//! # Replaced lockfiles
//!
//! Evicting an entry deletes its lockfile while the evictor still holds it. A process that
//! was blocked on that file then wakes up holding a lock on an unlinked inode, which no longer
//! excludes anyone. After locking, [`CacheLock::acquire`] therefore checks that the path
//! still names the file it locked and reopens it otherwise, up to
//! [`LOCK_ATTEMPTS`](crate::constants::LOCK_ATTEMPTS) times.

use crate::constants::LOCK_ATTEMPTS;
use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Any number of holders
    Shared,
    /// A single holder
    Exclusive,
}

/// A held advisory lock on a lockfile.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl CacheLock {
    /// Opens (creating if needed) the lockfile at `path` and locks it in `mode`.
    ///
    /// Blocks until the lock is granted. The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// Fails when the lockfile cannot be created or locked, or when it was replaced more than
    /// [`LOCK_ATTEMPTS`] times while waiting.
    pub fn acquire(path: &Path, mode: LockMode) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create locks directory: {}", parent.display())
            })?;
        }

        for attempt in 1..=LOCK_ATTEMPTS {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(path)
                .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

            debug!(path = %path.display(), ?mode, attempt, "Waiting for cache lock");
            match mode {
                LockMode::Shared => FileExt::lock_shared(&file),
                LockMode::Exclusive => FileExt::lock_exclusive(&file),
            }
            .with_context(|| format!("Failed to lock {}", path.display()))?;

            if is_current(&file, path) {
                debug!(path = %path.display(), ?mode, "Cache lock acquired");
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                    mode,
                });
            }
            debug!(path = %path.display(), "Lock file was replaced while waiting, reopening");
        }

        anyhow::bail!(
            "Failed to lock {}: the lock file was replaced {} times while waiting",
            path.display(),
            LOCK_ATTEMPTS
        )
    }

    /// The lockfile path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The mode this lock is held in.
    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %e, "Failed to unlock");
        }
    }
}

/// Returns true when `path` still names the file behind `file`.
#[cfg(unix)]
fn is_current(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), fs::metadata(path)) {
        (Ok(held), Ok(named)) => held.dev() == named.dev() && held.ino() == named.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_current(_file: &File, path: &Path) -> bool {
    path.exists()
}
