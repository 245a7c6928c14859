//! Content-addressed directory cache with advisory locking
//!
//! A [`CacheStore`] maps opaque keys to directories under a root. Entries are populated lazily
//! by a caller-supplied closure, sealed read-only once populated, revalidated on every shared
//! acquisition and repopulated when validation fails. The store knows nothing about downloads;
//! the fetch pipeline builds its downloads and extracts caches on top of it.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├── <key>/           # entry directory, sealed read-only
//! └── .locks/
//!     ├── .root        # root sentinel
//!     └── <key>        # per-key lockfile
//! ```
//!
//! # Locking
//!
//! Two tiers of [`fs4`] locks coordinate processes and threads sharing a root:
//!
//! | Operation       | Root lock  | Key lock   |
//! |-----------------|------------|------------|
//! | read (acquire)  | shared     | shared     |
//! | populate        | shared     | exclusive  |
//! | evict           | shared     | exclusive  |
//! | remove_root     | exclusive  | -          |
//!
//! Per-key work on different keys never blocks beyond the shared root lock, valid entries are
//! read concurrently, and at most one populator runs per key. The root lock is always taken
//! before a key lock.
//!
//! # Example
//!
//! ```rust,no_run
//! use bindep::cache::{AcquireOptions, CacheStore};
//! use std::fs;
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = CacheStore::new("/tmp/cache");
//! let populate = |dir: &std::path::Path| -> anyhow::Result<()> {
//!     fs::write(dir.join("hello.txt"), "hello")?;
//!     Ok(())
//! };
//! let guard = store.acquire("abc123", &AcquireOptions {
//!     populate: Some(&populate),
//!     ..Default::default()
//! })?;
//! println!("{}", fs::read_to_string(guard.path().join("hello.txt"))?);
//! # Ok(())
//! # }
//! ```

pub mod lock;
pub mod seal;

pub use lock::{CacheLock, LockMode};

use crate::constants::{LOCKS_DIR, ROOT_LOCK_NAME};
use crate::core::BindepError;
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Callback run against an entry directory.
pub type EntryFn<'a> = &'a dyn Fn(&Path) -> Result<()>;

/// Options for [`CacheStore::acquire`].
#[derive(Default, Clone, Copy)]
pub struct AcquireOptions<'a> {
    /// Checks an existing entry; an error marks the entry invalid.
    pub validate: Option<EntryFn<'a>>,
    /// Fills a freshly created, empty entry directory.
    pub populate: Option<EntryFn<'a>>,
    /// Accept an existing entry without running `validate`.
    ///
    /// A freshly populated entry is validated regardless.
    pub trust: bool,
}

impl fmt::Debug for AcquireOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquireOptions")
            .field("validate", &self.validate.is_some())
            .field("populate", &self.populate.is_some())
            .field("trust", &self.trust)
            .finish()
    }
}

/// A cache entry held under shared locks.
///
/// The entry cannot be repopulated, evicted or removed while the guard is alive. Dropping the
/// guard releases both locks.
#[derive(Debug)]
pub struct CacheGuard {
    dir: PathBuf,
    key: String,
    // Field order matters: the key lock is released before the root lock
    _key_lock: CacheLock,
    _root_lock: CacheLock,
}

impl CacheGuard {
    /// The entry directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// The entry's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Releases both locks.
    pub fn unlock(self) {
        debug!(key = %self.key, "Releasing cache entry");
    }
}

/// A cache root.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at `root`. Nothing is created on disk until first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory an entry lives in. The key is not validated.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn locks_dir(&self) -> PathBuf {
        self.root.join(LOCKS_DIR)
    }

    fn key_lock_path(&self, key: &str) -> PathBuf {
        self.locks_dir().join(key)
    }

    fn root_lock(&self, mode: LockMode) -> Result<CacheLock> {
        CacheLock::acquire(&self.locks_dir().join(ROOT_LOCK_NAME), mode)
    }

    /// Returns a shared-locked, valid entry for `key`, populating it first if needed.
    ///
    /// An existing entry is returned when `options.trust` is set or `options.validate`
    /// accepts it. Otherwise the entry is rebuilt under an exclusive key lock: any invalid
    /// content is removed, an empty directory is created, `populate` fills it and the result
    /// is sealed. The new entry is then reacquired shared and validated, even when trusting.
    ///
    /// # Errors
    ///
    /// - [`BindepError::InvalidCacheKey`] before any I/O when `key` is not a plain segment
    /// - [`BindepError::CacheEntryInvalid`] when the entry needs populating but no populate
    ///   function was given
    /// - the populate or validate error when either fails on a fresh entry
    pub fn acquire(&self, key: &str, options: &AcquireOptions<'_>) -> Result<CacheGuard> {
        validate_key(key)?;
        let dir = self.entry_path(key);

        {
            let guard = self.lock_entry(key)?;
            match check(&dir, options) {
                Ok(()) => {
                    debug!(key, root = %self.root.display(), "Cache hit");
                    return Ok(guard);
                }
                Err(reason) => debug!(key, %reason, "Cache entry unusable, repopulating"),
            }
        }

        let Some(populate) = options.populate else {
            return Err(BindepError::CacheEntryInvalid {
                key: key.to_string(),
                reason: "entry is missing or invalid and cannot be populated".to_string(),
            }
            .into());
        };

        self.populate_locked(key, &dir, populate, options)?;

        let guard = self.lock_entry(key)?;
        if !dir.is_dir() {
            return Err(BindepError::CacheEntryInvalid {
                key: key.to_string(),
                reason: "entry disappeared after populating".to_string(),
            }
            .into());
        }
        if let Some(validate) = options.validate {
            validate(&dir)
                .with_context(|| format!("Cache entry '{key}' failed validation after populating"))?;
        }
        Ok(guard)
    }

    /// Removes the entry for `key` and its lockfile. Missing entries are a no-op.
    ///
    /// # Errors
    ///
    /// [`BindepError::InvalidCacheKey`] for an invalid key, [`BindepError::NotADirectory`] when
    /// the entry path is not a directory, or the removal error.
    pub fn evict(&self, key: &str) -> Result<()> {
        self.evict_with(key, &|| -> Result<()> { Ok(()) })
    }

    /// Like [`evict`](Self::evict), also running `cleanup` while the key is locked exclusively.
    ///
    /// `cleanup` runs whether or not the entry exists, so state kept beside the entry is
    /// removed together with it.
    pub fn evict_with(&self, key: &str, cleanup: &dyn Fn() -> Result<()>) -> Result<()> {
        validate_key(key)?;
        let dir = self.entry_path(key);
        let key_lock_path = self.key_lock_path(key);

        let _root_lock = self.root_lock(LockMode::Shared)?;
        let _key_lock = CacheLock::acquire(&key_lock_path, LockMode::Exclusive)?;

        let metadata = match fs::symlink_metadata(&dir) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key, "Nothing to evict");
                return cleanup();
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to inspect {}", dir.display()));
            }
        };
        if !metadata.is_dir() {
            return Err(BindepError::NotADirectory {
                path: dir.display().to_string(),
            }
            .into());
        }

        seal::unseal(&dir);
        fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to remove cache entry {}", dir.display()))?;
        cleanup()?;
        // Waiters holding the old lockfile notice the replacement and reopen
        fs::remove_file(&key_lock_path).with_context(|| {
            format!("Failed to remove lock file {}", key_lock_path.display())
        })?;
        info!(key, root = %self.root.display(), "Evicted cache entry");
        Ok(())
    }

    /// Removes every entry and lockfile under the root, keeping only the root sentinel.
    ///
    /// Waits for all in-flight per-key work on this root to finish.
    pub fn remove_root(&self) -> Result<()> {
        let _root_lock = self.root_lock(LockMode::Exclusive)?;
        let locks_dir = self.locks_dir();

        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read cache root {}", self.root.display()))?
        {
            let path = entry?.path();
            if path == locks_dir {
                continue;
            }
            remove_any(&path)?;
        }

        for entry in fs::read_dir(&locks_dir)
            .with_context(|| format!("Failed to read locks directory {}", locks_dir.display()))?
        {
            let entry = entry?;
            if entry.file_name() == ROOT_LOCK_NAME {
                continue;
            }
            remove_any(&entry.path())?;
        }

        info!(root = %self.root.display(), "Removed cache root");
        Ok(())
    }

    /// Takes the shared root and shared key locks.
    fn lock_entry(&self, key: &str) -> Result<CacheGuard> {
        let root_lock = self.root_lock(LockMode::Shared)?;
        let key_lock = CacheLock::acquire(&self.key_lock_path(key), LockMode::Shared)?;
        Ok(CacheGuard {
            dir: self.entry_path(key),
            key: key.to_string(),
            _key_lock: key_lock,
            _root_lock: root_lock,
        })
    }

    fn populate_locked(
        &self,
        key: &str,
        dir: &Path,
        populate: EntryFn<'_>,
        options: &AcquireOptions<'_>,
    ) -> Result<()> {
        let _root_lock = self.root_lock(LockMode::Shared)?;
        let _key_lock = CacheLock::acquire(&self.key_lock_path(key), LockMode::Exclusive)?;

        // Another process may have populated the entry while we waited
        if check(dir, options).is_ok() {
            debug!(key, "Cache entry populated concurrently");
            return Ok(());
        }

        if fs::symlink_metadata(dir).is_ok() {
            debug!(key, path = %dir.display(), "Removing invalid cache entry");
            remove_any(dir)?;
        }

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache entry {}", dir.display()))?;
        info!(key, root = %self.root.display(), "Populating cache entry");

        if let Err(e) = populate(dir) {
            // Leave nothing half-written behind
            seal::unseal(dir);
            let _ = fs::remove_dir_all(dir);
            return Err(e.context(format!("Failed to populate cache entry '{key}'")));
        }

        seal::seal(dir);
        Ok(())
    }
}

/// Rejects keys that are not a single, non-hidden path segment.
fn validate_key(key: &str) -> Result<(), BindepError> {
    if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\', '\0']) {
        return Err(BindepError::InvalidCacheKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Whether an existing entry can be handed out.
fn check(dir: &Path, options: &AcquireOptions<'_>) -> Result<(), String> {
    if !dir.is_dir() {
        return Err("entry does not exist".to_string());
    }
    if options.trust {
        return Ok(());
    }
    match options.validate {
        Some(validate) => validate(dir).map_err(|e| format!("{e:#}")),
        None => Ok(()),
    }
}

/// Unseals and removes a file or directory.
fn remove_any(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to inspect {}", path.display()))?;
    if metadata.is_dir() {
        seal::unseal(path);
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .with_context(|| format!("Failed to remove {}", path.display()))
}
