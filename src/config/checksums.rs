//! Maintaining `url_checksums`.
//!
//! Every URL a dependency can resolve to should have a checksum recorded before it is
//! installed. [`Config::add_checksums`] downloads the URLs that lack one and records their
//! SHA-256; [`Config::prune_checksums`] drops entries no dependency can reach anymore.

use super::Config;
use crate::core::System;
use crate::fetch::{Fetcher, fetch_to};
use crate::utils::fs::file_sha256;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::info;

impl Config {
    /// Every URL the given dependencies resolve to on the given systems.
    ///
    /// Empty `dependencies` means all; empty `systems` means each dependency's own systems.
    pub fn reachable_urls(
        &self,
        dependencies: &[String],
        systems: &[System],
    ) -> Result<BTreeSet<String>> {
        let mut urls = BTreeSet::new();
        for name in self.dependency_names(dependencies) {
            for system in self.target_systems(&name, systems)? {
                urls.insert(self.build_dependency(&name, &system)?.url().to_string());
            }
        }
        Ok(urls)
    }

    /// Downloads every reachable URL without a checksum and records its SHA-256.
    ///
    /// Returns the URLs that were added.
    pub fn add_checksums(
        &mut self,
        dependencies: &[String],
        systems: &[System],
        fetcher: &dyn Fetcher,
    ) -> Result<Vec<String>> {
        let missing: Vec<String> = self
            .reachable_urls(dependencies, systems)?
            .into_iter()
            .filter(|url| !self.url_checksums.contains_key(url))
            .collect();
        if missing.is_empty() {
            return Ok(missing);
        }

        let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
        for (i, url) in missing.iter().enumerate() {
            let path = scratch.path().join(i.to_string());
            fetch_to(fetcher, url, &path)
                .with_context(|| format!("Failed to download {url} for its checksum"))?;
            let checksum = file_sha256(&path)?;
            info!(%url, %checksum, "Recorded checksum");
            self.url_checksums.insert(url.clone(), checksum);
        }
        Ok(missing)
    }

    /// Removes checksums of URLs no dependency resolves to on any of its systems.
    ///
    /// Returns the URLs that were removed.
    pub fn prune_checksums(&mut self) -> Result<Vec<String>> {
        let reachable = self.reachable_urls(&[], &[])?;
        let unreachable: Vec<String> =
            self.url_checksums.keys().filter(|url| !reachable.contains(*url)).cloned().collect();
        for url in &unreachable {
            self.url_checksums.remove(url);
            info!(%url, "Pruned checksum");
        }
        Ok(unreachable)
    }
}
