//! Global constants used throughout the bindep codebase.
//!
//! File layout names, environment variables, retry bounds and parallelism defaults are
//! defined here so the cache, fetch and CLI layers agree on them.

/// Directory holding lockfiles inside every cache root.
pub const LOCKS_DIR: &str = ".locks";

/// Name of the per-root sentinel lockfile inside [`LOCKS_DIR`].
pub const ROOT_LOCK_NAME: &str = ".root";

/// Attempts made to lock a lockfile that keeps being replaced underneath the waiter.
///
/// Eviction deletes the key's lockfile while holding it, so a waiter can wake up holding a
/// lock on an unlinked file. It then reopens the path; this bounds how often.
pub const LOCK_ATTEMPTS: usize = 10;

/// Cache subdirectory holding downloaded files.
pub const DOWNLOADS_DIR: &str = "downloads";

/// Cache subdirectory holding extracted archives.
pub const EXTRACTS_DIR: &str = "extracts";

/// Directory (inside the extracts root) holding directory checksums of extracted entries.
pub const EXTRACT_SUMS_DIR: &str = ".extract_sums";

/// Number of hex characters of the checksum hash used as a cache key.
pub const CACHE_KEY_LEN: usize = 16;

/// Default cache directory name, relative to the config file's directory.
pub const DEFAULT_CACHE_DIR: &str = ".bindep";

/// Default install directory name, relative to the config file's directory.
pub const DEFAULT_INSTALL_DIR: &str = "bin";

/// Config file names searched in the current directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["bindep.yaml", "bindep.yml", "bindep.json"];

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "BINDEP_CONFIG";

/// Environment variable overriding the cache directory.
pub const CACHE_ENV: &str = "BINDEP_CACHE";

/// Environment variable enabling trust-cache mode.
pub const TRUST_CACHE_ENV: &str = "BINDEP_TRUST_CACHE";

/// Environment variable disabling progress spinners.
pub const NO_PROGRESS_ENV: &str = "BINDEP_NO_PROGRESS";

/// Minimum number of parallel installs.
pub const MIN_PARALLELISM: usize = 4;

/// Parallel installs per CPU core.
pub const PARALLELISM_CORE_MULTIPLIER: usize = 2;

/// Core count assumed when it cannot be detected.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Default number of dependency/system pairs installed concurrently.
pub fn default_max_parallel() -> usize {
    let cores = std::thread::available_parallelism().map_or(FALLBACK_CORE_COUNT, |n| n.get());
    (cores * PARALLELISM_CORE_MULTIPLIER).max(MIN_PARALLELISM)
}
