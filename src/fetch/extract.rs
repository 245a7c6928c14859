//! Extracting downloads into the extracts cache.
//!
//! Extracted entries reuse the download's cache key. After unpacking, the directory checksum
//! of the entry is recorded in `<extracts>/.extract_sums/<key>.sum` and every later acquisition
//! recomputes and compares it, unless the cache is trusted.

use super::archive;
use crate::cache::{AcquireOptions, CacheGuard, CacheStore};
use crate::constants::EXTRACT_SUMS_DIR;
use crate::core::BindepError;
use crate::utils::fs::{atomic_write, dir_checksum, remove_existing};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for [`extract`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Evict any existing extraction first
    pub force: bool,
    /// Skip recomputing the directory checksum of an existing entry
    pub trust_cache: bool,
}

/// An extracted archive, held in the cache.
#[derive(Debug)]
pub struct Extracted {
    /// The extracted directory
    pub path: PathBuf,
    /// Keeps the entry from being evicted while it is used
    pub guard: CacheGuard,
}

/// The file holding the recorded directory checksum for `key`.
pub fn sum_path(cache: &CacheStore, key: &str) -> PathBuf {
    cache.root().join(EXTRACT_SUMS_DIR).join(format!("{key}.sum"))
}

/// Extracts `archive` into `cache` under `key`.
pub fn extract(
    archive: &Path,
    cache: &CacheStore,
    key: &str,
    options: &ExtractOptions,
) -> Result<Extracted> {
    let sum_file = sum_path(cache, key);
    if options.force {
        cache.evict_with(key, &|| remove_existing(&sum_file))?;
    }

    let validate = |dir: &Path| verify_dir(dir, &sum_file);
    let populate = |dir: &Path| {
        info!(archive = %archive.display(), dest = %dir.display(), "Extracting");
        archive::unpack(archive, dir)?;
        let sum = dir_checksum(dir)?;
        atomic_write(&sum_file, sum.as_bytes())
    };

    let guard = cache
        .acquire(key, &AcquireOptions {
            validate: Some(&validate),
            populate: Some(&populate),
            trust: options.trust_cache,
        })
        .with_context(|| format!("Failed to extract {}", archive.display()))?;

    Ok(Extracted {
        path: guard.path().to_path_buf(),
        guard,
    })
}

fn verify_dir(dir: &Path, sum_file: &Path) -> Result<()> {
    let wanted = fs::read_to_string(sum_file)
        .with_context(|| format!("Failed to read {}", sum_file.display()))?;
    let wanted = wanted.trim();
    let got = dir_checksum(dir)?;
    if got != wanted {
        return Err(BindepError::ChecksumMismatch {
            subject: dir.display().to_string(),
            wanted: wanted.to_string(),
            got,
        }
        .into());
    }
    Ok(())
}
