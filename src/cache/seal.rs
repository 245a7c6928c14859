//! Read-only sealing of populated cache entries.
//!
//! Sealed entries have every write bit cleared so an installed symlink cannot be used to modify
//! cached content by accident. Both directions are best-effort: a failure is logged at `warn`
//! and the walk continues.

use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Clears write permission on `path` and everything below it.
pub fn seal(path: &Path) {
    // Children first so directories are still writable while their contents change
    for entry in WalkDir::new(path).contents_first(true).follow_links(false) {
        match entry {
            Ok(entry) => {
                if !entry.path_is_symlink() {
                    set_writable(entry.path(), false);
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to walk entry while sealing"),
        }
    }
}

/// Restores owner write permission on `path` and everything below it.
pub fn unseal(path: &Path) {
    // Parents first so their children can be reached and modified
    for entry in WalkDir::new(path).follow_links(false) {
        match entry {
            Ok(entry) => {
                if !entry.path_is_symlink() {
                    set_writable(entry.path(), true);
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to walk entry while unsealing"),
        }
    }
}

#[cfg(unix)]
fn set_writable(path: &Path, writable: bool) {
    use std::os::unix::fs::PermissionsExt;

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read permissions");
            return;
        }
    };
    let mode = metadata.permissions().mode();
    let new_mode = if writable { mode | 0o200 } else { mode & !0o222 };
    if new_mode == mode {
        return;
    }
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(new_mode)) {
        warn!(path = %path.display(), error = %e, "Failed to change permissions");
    }
}

#[cfg(not(unix))]
fn set_writable(path: &Path, writable: bool) {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read permissions");
            return;
        }
    };
    // Directories ignore the readonly attribute on Windows
    if metadata.is_dir() {
        return;
    }
    let mut permissions = metadata.permissions();
    permissions.set_readonly(!writable);
    if let Err(e) = fs::set_permissions(path, permissions) {
        warn!(path = %path.display(), error = %e, "Failed to change permissions");
    }
}
