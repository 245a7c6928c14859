//! Shared helpers for the cache, fetch and CLI layers
//!
//! - [`fs`] - directory, atomic-write and checksum helpers
//! - [`progress`] - spinners for long-running CLI operations

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, cache_key, dir_checksum, ensure_dir, file_sha256};
pub use progress::Spinner;
