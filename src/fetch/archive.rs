//! Unpacking downloaded archives.
//!
//! The format is chosen from the file name:
//!
//! | Suffix              | Handling                                   |
//! |---------------------|--------------------------------------------|
//! | `.tar.gz`, `.tgz`   | gzip-compressed tarball                    |
//! | `.tar`              | tarball                                    |
//! | `.zip`              | zip archive                                |
//! | `.gz`               | single gzip file, written without `.gz`    |
//! | anything else       | copied into the destination as-is          |
//!
//! Entries that would land outside the destination are rejected.

use crate::core::BindepError;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    TarGz,
    Tar,
    Zip,
    Gz,
    Plain,
}

impl Format {
    fn detect(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Self::TarGz
        } else if lower.ends_with(".tar") {
            Self::Tar
        } else if lower.ends_with(".zip") {
            Self::Zip
        } else if lower.ends_with(".gz") {
            Self::Gz
        } else {
            Self::Plain
        }
    }
}

/// Unpacks `archive` into the existing directory `dest`.
pub fn unpack(archive: &Path, dest: &Path) -> Result<()> {
    let file_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Archive path has no file name: {}", archive.display()))?;
    let format = Format::detect(file_name);
    debug!(archive = %archive.display(), dest = %dest.display(), ?format, "Unpacking");

    let file =
        File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    match format {
        Format::TarGz => unpack_tar(GzDecoder::new(file), dest),
        Format::Tar => unpack_tar(file, dest),
        Format::Zip => {
            let mut zip = zip::ZipArchive::new(file)
                .with_context(|| format!("Failed to read zip archive {}", archive.display()))?;
            zip.extract(dest)
                .with_context(|| format!("Failed to extract {}", archive.display()))
        }
        Format::Gz => {
            let stem = &file_name[..file_name.len() - ".gz".len()];
            if stem.is_empty() {
                return Err(BindepError::InvalidArchive {
                    path: archive.display().to_string(),
                    reason: "a gzip file needs a name before .gz".to_string(),
                }
                .into());
            }
            let mut output = File::create(dest.join(stem))
                .with_context(|| format!("Failed to create {stem} in {}", dest.display()))?;
            io::copy(&mut GzDecoder::new(file), &mut output)
                .with_context(|| format!("Failed to decompress {}", archive.display()))?;
            Ok(())
        }
        Format::Plain => {
            fs::copy(archive, dest.join(file_name))
                .with_context(|| format!("Failed to copy {}", archive.display()))?;
            Ok(())
        }
    }
}

fn unpack_tar(reader: impl Read, dest: &Path) -> Result<()> {
    let mut tar = tar::Archive::new(reader);
    tar.set_preserve_permissions(true);
    tar.set_overwrite(true);

    for entry in tar.entries().context("Failed to read tar archive")? {
        let mut entry = entry.context("Failed to read tar entry")?;
        let path = entry.path().context("Invalid path in tar entry")?.into_owned();
        // unpack_in refuses entries outside dest and reports it with `false`
        let unpacked = entry
            .unpack_in(dest)
            .with_context(|| format!("Failed to unpack {}", path.display()))?;
        if !unpacked {
            anyhow::bail!("Archive entry escapes the destination: {}", path.display());
        }
    }
    Ok(())
}
