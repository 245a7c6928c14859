//! Downloading into the downloads cache.
//!
//! A download with a known checksum is cached under a key derived from that checksum, so two
//! dependencies pointing at identical content share one entry. Every cached file is re-hashed
//! before it is handed out unless the caller trusts the cache.
//!
//! Without a configured checksum the file is first fetched into a scratch directory and its
//! computed checksum becomes the key (trust on first use). This costs a download per call, and
//! is refused unless explicitly allowed.

use super::http::Fetcher;
use crate::cache::{AcquireOptions, CacheGuard, CacheStore};
use crate::core::BindepError;
use crate::models::BuiltDependency;
use crate::utils::fs::{cache_key, file_sha256};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for [`download`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    /// Download even when no checksum is configured for the URL
    pub allow_missing_checksum: bool,
    /// Evict any cached copy first
    pub force: bool,
    /// Skip re-hashing a cached file
    pub trust_cache: bool,
}

/// A downloaded file, held in the cache.
#[derive(Debug)]
pub struct Downloaded {
    /// The cached file
    pub path: PathBuf,
    /// The cache key, reused for the extracts cache
    pub key: String,
    /// The file's SHA-256
    pub checksum: String,
    /// Keeps the entry from being evicted while the file is used
    pub guard: CacheGuard,
}

/// Downloads `built`'s URL into `cache`, verifying it against its checksum.
///
/// # Errors
///
/// - [`BindepError::MissingChecksum`] when no checksum is configured and
///   `allow_missing_checksum` is not set
/// - [`BindepError::DownloadFailed`] for error statuses
/// - [`BindepError::ChecksumMismatch`] when the downloaded content has a different hash; the
///   offending file is deleted first
pub fn download(
    built: &BuiltDependency,
    cache: &CacheStore,
    options: &DownloadOptions,
    fetcher: &dyn Fetcher,
) -> Result<Downloaded> {
    let file_name = built.file_name();

    if built.checksum().is_empty() {
        if !options.allow_missing_checksum {
            return Err(BindepError::MissingChecksum {
                name: built.name().to_string(),
            }
            .into());
        }
        return download_unverified(built, cache, options, fetcher);
    }

    let wanted = built.checksum().to_ascii_lowercase();
    let key = cache_key(&wanted);
    if options.force {
        cache.evict(&key)?;
    }

    let validate = |dir: &Path| verify_file(&dir.join(file_name), &wanted);
    let populate = |dir: &Path| {
        let path = dir.join(file_name);
        fetch_to(fetcher, built.url(), &path)?;
        verify_file(&path, &wanted)
    };

    let guard = cache
        .acquire(&key, &AcquireOptions {
            validate: Some(&validate),
            populate: Some(&populate),
            trust: options.trust_cache,
        })
        .with_context(|| format!("Failed to download '{}' from {}", built.name(), built.url()))?;

    Ok(Downloaded {
        path: guard.path().join(file_name),
        key,
        checksum: wanted,
        guard,
    })
}

/// Trust-on-first-use download for a URL without a configured checksum.
fn download_unverified(
    built: &BuiltDependency,
    cache: &CacheStore,
    options: &DownloadOptions,
    fetcher: &dyn Fetcher,
) -> Result<Downloaded> {
    let file_name = built.file_name();
    warn!(dependency = built.name(), url = built.url(), "No checksum configured, trusting download");

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let scratch_file = scratch.path().join(file_name);
    fetch_to(fetcher, built.url(), &scratch_file)
        .with_context(|| format!("Failed to download '{}' from {}", built.name(), built.url()))?;
    let checksum = file_sha256(&scratch_file)?;
    let key = cache_key(&checksum);
    if options.force {
        cache.evict(&key)?;
    }

    let validate = |dir: &Path| verify_file(&dir.join(file_name), &checksum);
    let populate = |dir: &Path| {
        fs::copy(&scratch_file, dir.join(file_name))
            .with_context(|| format!("Failed to copy {} into the cache", scratch_file.display()))?;
        Ok(())
    };

    let guard = cache.acquire(&key, &AcquireOptions {
        validate: Some(&validate),
        populate: Some(&populate),
        trust: options.trust_cache,
    })?;

    Ok(Downloaded {
        path: guard.path().join(file_name),
        key,
        checksum,
        guard,
    })
}

/// Streams `url` into a new file at `dest`.
pub fn fetch_to(fetcher: &dyn Fetcher, url: &str, dest: &Path) -> Result<()> {
    info!(url, dest = %dest.display(), "Downloading");
    let mut body = fetcher.get(url)?.into_body(url)?;
    let mut file =
        File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let bytes = io::copy(&mut body, &mut file)
        .with_context(|| format!("Failed to download {url}"))?;
    file.sync_all().with_context(|| format!("Failed to sync {}", dest.display()))?;
    debug!(url, bytes, "Download complete");
    Ok(())
}

/// Checks that `path` hashes to `wanted`, deleting it when it does not.
fn verify_file(path: &Path, wanted: &str) -> Result<()> {
    let got = file_sha256(path)?;
    if got != wanted {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove file with bad checksum");
        }
        return Err(BindepError::ChecksumMismatch {
            subject: path.display().to_string(),
            wanted: wanted.to_string(),
            got,
        }
        .into());
    }
    Ok(())
}
