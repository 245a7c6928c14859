//! Installing a binary out of an extracted cache entry.

use crate::models::BuiltDependency;
use crate::utils::fs::{ensure_parent_dir, file_sha256, remove_existing};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// The binary's path inside `extracted_dir`.
///
/// # Errors
///
/// Fails when the configured path leaves the directory or does not exist in it.
pub fn source_path(built: &BuiltDependency, extracted_dir: &Path) -> Result<PathBuf> {
    let relative = Path::new(built.source_path());
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
    {
        anyhow::bail!(
            "Binary path '{}' of '{}' must stay inside the archive",
            relative.display(),
            built.name()
        );
    }

    let source = extracted_dir.join(relative);
    if !source.exists() {
        anyhow::bail!(
            "'{}' not found in the archive for '{}' ({})",
            relative.display(),
            built.name(),
            built.url()
        );
    }
    Ok(source)
}

/// Installs `built`'s binary from `extracted_dir` to `target`.
///
/// Linked dependencies become a relative symlink into the cache; others are copied. Either
/// way the installed file gains execute permission and an existing `target` is replaced,
/// unless it already is the installed binary, in which case it is left untouched.
pub fn install(built: &BuiltDependency, extracted_dir: &Path, target: &Path) -> Result<()> {
    let source = source_path(built, extracted_dir)?;
    if is_installed(&source, target, built.link())? {
        debug!(dependency = built.name(), target = %target.display(), "Already installed");
        return Ok(());
    }
    ensure_parent_dir(target)?;
    remove_existing(target)?;

    if built.link() {
        link(&source, target)?;
        add_exec_bits(&source)?;
    } else {
        copy(&source, target)?;
        add_exec_bits(target)?;
    }

    info!(
        dependency = built.name(),
        system = %built.system(),
        target = %target.display(),
        link = built.link(),
        "Installed"
    );
    Ok(())
}

#[cfg(unix)]
fn link(source: &Path, target: &Path) -> Result<()> {
    let source = fs::canonicalize(source)
        .with_context(|| format!("Failed to resolve {}", source.display()))?;
    let target_dir = target.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let target_dir = fs::canonicalize(target_dir)
        .with_context(|| format!("Failed to resolve {}", target_dir.display()))?;

    let relative = relative_path(&target_dir, &source);
    std::os::unix::fs::symlink(&relative, target).with_context(|| {
        format!("Failed to link {} -> {}", target.display(), relative.display())
    })
}

// Symlinks need elevated privileges on Windows
#[cfg(not(unix))]
fn link(source: &Path, target: &Path) -> Result<()> {
    tracing::warn!(target = %target.display(), "Symlinks are not supported here, copying instead");
    copy(source, target)
}

fn copy(source: &Path, target: &Path) -> Result<()> {
    // A fresh file, so the cache's read-only mode is not carried over
    let mut input =
        File::open(source).with_context(|| format!("Failed to open {}", source.display()))?;
    let mut output =
        File::create(target).with_context(|| format!("Failed to create {}", target.display()))?;
    io::copy(&mut input, &mut output).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), target.display())
    })?;
    Ok(())
}

/// Whether `target` already holds what installing `source` would produce.
fn is_installed(source: &Path, target: &Path, link: bool) -> Result<bool> {
    let Ok(metadata) = fs::symlink_metadata(target) else {
        return Ok(false);
    };
    if cfg!(unix) && link {
        if !metadata.file_type().is_symlink() {
            return Ok(false);
        }
        let source = fs::canonicalize(source)
            .with_context(|| format!("Failed to resolve {}", source.display()))?;
        return Ok(fs::canonicalize(target).is_ok_and(|t| t == source));
    }
    if !metadata.is_file() || !is_executable(&metadata) {
        return Ok(false);
    }
    Ok(file_sha256(source)? == file_sha256(target)?)
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 == 0o111
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

#[cfg(unix)]
fn add_exec_bits(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)
        .with_context(|| format!("Failed to read permissions of {}", path.display()))?
        .permissions()
        .mode();
    if mode & 0o111 == 0o111 {
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o111))
        .with_context(|| format!("Failed to make {} executable", path.display()))
}

#[cfg(not(unix))]
fn add_exec_bits(_path: &Path) -> Result<()> {
    Ok(())
}

/// The path of `to` relative to the directory `from`. Both must be absolute.
fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_os_str());
    }
    relative
}
