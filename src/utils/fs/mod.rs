//! File system helpers
//!
//! Directory creation and removal, atomic file replacement and the SHA-256 checksums the cache
//! keys and validators are built on.

pub mod atomic;
pub mod checksum;
pub mod dirs;

pub use atomic::atomic_write;
pub use checksum::{cache_key, dir_checksum, file_sha256};
pub use dirs::{ensure_dir, ensure_parent_dir, remove_existing};
