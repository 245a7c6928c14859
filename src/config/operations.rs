//! Download, extract, install and cache maintenance for configured dependencies.

use super::Config;
use crate::cache::CacheStore;
use crate::constants::{DOWNLOADS_DIR, EXTRACTS_DIR};
use crate::core::System;
use crate::fetch::{self, DownloadOptions, ExtractOptions, Fetcher};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Options for [`Config::install_dependency`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Download and extract options
    pub fetch: DownloadOptions,
    /// Install to this path instead of `<install_dir>/<bin>`
    pub output: Option<PathBuf>,
    /// Return the binary's path inside the cache without installing it
    pub to_cache: bool,
}

/// A dependency/system pair that failed validation.
#[derive(Debug)]
pub struct ValidationFailure {
    /// The dependency name
    pub dependency: String,
    /// The system it was validated for
    pub system: System,
    /// Why it failed
    pub error: anyhow::Error,
}

/// The outcome of [`Config::validate`].
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Number of dependency/system pairs checked
    pub checked: usize,
    /// The pairs that failed
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// True when every pair passed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Config {
    /// The downloads cache.
    pub fn downloads_cache(&self) -> Result<CacheStore> {
        Ok(CacheStore::new(self.cache_dir()?.join(DOWNLOADS_DIR)))
    }

    /// The extracts cache.
    pub fn extracts_cache(&self) -> Result<CacheStore> {
        Ok(CacheStore::new(self.cache_dir()?.join(EXTRACTS_DIR)))
    }

    /// Downloads a dependency into the cache and returns the cached file.
    pub fn download_dependency(
        &self,
        name: &str,
        system: &System,
        options: &DownloadOptions,
        fetcher: &dyn Fetcher,
    ) -> Result<PathBuf> {
        let built = self.build_checked(name, system)?;
        let downloaded = fetch::download(&built, &self.downloads_cache()?, options, fetcher)?;
        Ok(downloaded.path)
    }

    /// Downloads and extracts a dependency and returns the extracted directory.
    pub fn extract_dependency(
        &self,
        name: &str,
        system: &System,
        options: &DownloadOptions,
        fetcher: &dyn Fetcher,
    ) -> Result<PathBuf> {
        let built = self.build_checked(name, system)?;
        let downloaded = fetch::download(&built, &self.downloads_cache()?, options, fetcher)?;
        let extracted = fetch::extract(
            &downloaded.path,
            &self.extracts_cache()?,
            &downloaded.key,
            &extract_options(options),
        )?;
        Ok(extracted.path)
    }

    /// Installs a dependency's binary for `system` and returns where it was installed.
    ///
    /// With `to_cache` set, nothing is installed and the binary's path inside the extracts
    /// cache is returned instead.
    pub fn install_dependency(
        &self,
        name: &str,
        system: &System,
        options: &InstallOptions,
        fetcher: &dyn Fetcher,
    ) -> Result<PathBuf> {
        let built = self.build_checked(name, system)?;
        debug!(dependency = name, %system, url = built.url(), "Installing");

        let downloaded =
            fetch::download(&built, &self.downloads_cache()?, &options.fetch, fetcher)?;
        let extracted = fetch::extract(
            &downloaded.path,
            &self.extracts_cache()?,
            &downloaded.key,
            &extract_options(&options.fetch),
        )?;

        if options.to_cache {
            return fetch::install::source_path(&built, &extracted.path);
        }

        let target = match &options.output {
            Some(output) => output.clone(),
            None => self.install_dir()?.join(built.installed_name()),
        };
        fetch::install(&built, &extracted.path, &target)
            .with_context(|| format!("Failed to install '{name}' to {}", target.display()))?;
        Ok(target)
    }

    /// Runs the full pipeline for every dependency/system pair into a scratch cache and
    /// install directory, collecting failures instead of stopping at the first.
    ///
    /// `dependencies` defaults to all dependencies; `systems` defaults to each dependency's
    /// systems.
    pub fn validate(
        &self,
        dependencies: &[String],
        systems: &[System],
        fetcher: &dyn Fetcher,
    ) -> Result<ValidationReport> {
        let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
        let mut scratch_config = self.clone();
        scratch_config.cache = Some(scratch.path().join("cache").display().to_string());
        scratch_config.install_dir = Some(scratch.path().join("bin").display().to_string());

        let mut report = ValidationReport::default();
        for name in self.dependency_names(dependencies) {
            let targets = match self.target_systems(&name, systems) {
                Ok(targets) => targets,
                Err(error) => {
                    report.failures.push(ValidationFailure {
                        dependency: name.clone(),
                        system: System::current(),
                        error,
                    });
                    continue;
                }
            };

            for system in targets {
                report.checked += 1;
                let result = scratch_config.install_dependency(
                    &name,
                    &system,
                    &InstallOptions {
                        output: Some(scratch.path().join("out").join(&name).join(system.as_str())),
                        ..Default::default()
                    },
                    fetcher,
                );
                match result {
                    Ok(path) => debug!(dependency = %name, %system, path = %path.display(), "Valid"),
                    Err(error) => report.failures.push(ValidationFailure {
                        dependency: name.clone(),
                        system,
                        error,
                    }),
                }
            }
        }

        info!(checked = report.checked, failed = report.failures.len(), "Validation finished");
        Ok(report)
    }

    /// Removes everything from the downloads and extracts caches.
    pub fn clear_cache(&self) -> Result<()> {
        for cache in [self.downloads_cache()?, self.extracts_cache()?] {
            if cache.root().exists() {
                cache.remove_root()?;
            }
        }
        Ok(())
    }

    /// `requested` when non-empty, else every dependency name.
    pub(crate) fn dependency_names(&self, requested: &[String]) -> Vec<String> {
        if requested.is_empty() {
            self.dependencies.keys().cloned().collect()
        } else {
            requested.to_vec()
        }
    }
}

fn extract_options(options: &DownloadOptions) -> ExtractOptions {
    ExtractOptions {
        force: options.force,
        trust_cache: options.trust_cache,
    }
}
