//! The bindep config file
//!
//! A config declares dependencies, the templates they build on, where to fetch remote templates
//! from, and the checksums of every URL that may be downloaded. It is read from and written back
//! to YAML (`bindep.yaml`) or JSON (`bindep.json`):
//!
//! ```yaml
//! cache: ~/.cache/bindep
//! install_dir: bin
//! systems: [linux/amd64, darwin/arm64]
//! dependencies:
//!   foo:
//!     template: foo-release
//!     vars:
//!       version: 1.2.3
//! templates:
//!   foo-release:
//!     url: https://example.com/v{{ version }}/foo-{{ os }}-{{ arch }}.tar.gz
//!     archive_path: foo-{{ os }}/bin/foo
//! url_checksums:
//!   https://example.com/v1.2.3/foo-linux-amd64.tar.gz: 2cf24dba...
//! ```
//!
//! All maps are ordered, so writing a config back produces stable, diffable output.
//!
//! Operations on a config live in submodules:
//! - [`operations`] - download, extract, install, validate and cache maintenance
//! - [`checksums`] - recording and pruning `url_checksums`
//! - [`sources`] - importing templates from other config files

pub mod checksums;
pub mod operations;
pub mod sources;

pub use operations::{InstallOptions, ValidationFailure, ValidationReport};

use crate::constants::{CONFIG_FILE_NAMES, DEFAULT_CACHE_DIR, DEFAULT_INSTALL_DIR};
use crate::core::{BindepError, System};
use crate::models::{BuiltDependency, Dependency};
use crate::resolver;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialization format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML, the default
    Yaml,
    /// JSON
    Json,
}

impl Format {
    /// Picks the format from a file name's extension, falling back to sniffing `content`.
    pub fn detect(name: &str, content: Option<&str>) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Self::Json
        } else if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            Self::Yaml
        } else if content.is_some_and(|c| c.trim_start().starts_with('{')) {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

/// A parsed config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Cache directory; defaults to `.bindep` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,

    /// Directory binaries are installed to; defaults to `bin` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<String>,

    /// Systems every dependency is built for unless it narrows them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<System>,

    /// Declared dependencies by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, Dependency>,

    /// Templates by name; imported templates are named `source#template`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub templates: BTreeMap<String, Dependency>,

    /// Other config documents templates can be imported from, by name.
    ///
    /// Values are local paths (relative to this config) or http(s) URLs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub template_sources: BTreeMap<String, String>,

    /// SHA-256 of every downloadable URL.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub url_checksums: BTreeMap<String, String>,

    /// Directory relative paths resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// [`BindepError::ConfigError`] describing the parse failure.
    pub fn parse(content: &str, format: Format) -> Result<Self, BindepError> {
        let parsed = match format {
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| BindepError::ConfigError {
            message,
        })
    }

    /// Serializes the config.
    pub fn to_document(&self, format: Format) -> Result<String> {
        Ok(match format {
            Format::Json => {
                let mut json =
                    serde_json::to_string_pretty(self).context("Failed to serialize config")?;
                json.push('\n');
                json
            }
            Format::Yaml => serde_yaml::to_string(self).context("Failed to serialize config")?,
        })
    }

    /// Loads the config file at `path`; relative paths inside it resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let mut config = Self::parse(&content, Format::detect(&name, Some(&content)))
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        config.base_dir = Some(std::path::absolute(dir).with_context(|| {
            format!("Failed to resolve config directory: {}", dir.display())
        })?);
        debug!(
            path = %path.display(),
            dependencies = config.dependencies.len(),
            templates = config.templates.len(),
            "Loaded config"
        );
        Ok(config)
    }

    /// Writes the config to `path` atomically, as JSON for `.json` paths and YAML otherwise.
    pub fn write(&self, path: &Path) -> Result<()> {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let content = self.to_document(Format::detect(&name, None))?;
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Finds the config file: `explicit` when given, else the first default name present in
    /// the current directory.
    pub fn find(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(BindepError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                }
                .into());
            }
            return Ok(path.to_path_buf());
        }

        CONFIG_FILE_NAMES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .ok_or_else(|| {
                BindepError::ConfigError {
                    message: format!(
                        "no config file found in the current directory (looked for {})",
                        CONFIG_FILE_NAMES.join(", ")
                    ),
                }
                .into()
            })
    }

    /// The directory relative paths resolve against.
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Sets the directory relative paths resolve against.
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.base_dir = Some(dir.into());
    }

    /// Expands `~` and environment variables in `value` and resolves it against the base dir.
    pub fn resolve_path(&self, value: &str) -> Result<PathBuf> {
        let expanded = shellexpand::full(value)
            .with_context(|| format!("Failed to expand path '{value}'"))?;
        let path = PathBuf::from(expanded.as_ref());
        Ok(if path.is_absolute() { path } else { self.base_dir().join(path) })
    }

    /// The cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        self.resolve_path(self.cache.as_deref().unwrap_or(DEFAULT_CACHE_DIR))
    }

    /// The install directory.
    pub fn install_dir(&self) -> Result<PathBuf> {
        self.resolve_path(self.install_dir.as_deref().unwrap_or(DEFAULT_INSTALL_DIR))
    }

    /// Resolves the named dependency for `system`.
    pub fn build_dependency(&self, name: &str, system: &System) -> Result<BuiltDependency> {
        resolver::build(self, name, system)
            .with_context(|| format!("Failed to resolve '{name}' for {system}"))
    }

    /// The systems a dependency is built for.
    ///
    /// The dependency's own systems (after templates) intersected with the config's systems;
    /// when either list is empty the other one is used as-is.
    pub fn dependency_systems(&self, name: &str) -> Result<Vec<System>, BindepError> {
        let dep = resolver::with_templates(self, name)?;
        Ok(match (dep.systems.is_empty(), self.systems.is_empty()) {
            (true, _) => self.systems.clone(),
            (false, true) => dep.systems,
            (false, false) => {
                dep.systems.into_iter().filter(|s| self.systems.contains(s)).collect()
            }
        })
    }

    /// Systems to operate on for a dependency: `requested` when given, else its declared
    /// systems, else the current one.
    pub fn target_systems(&self, name: &str, requested: &[System]) -> Result<Vec<System>> {
        if !requested.is_empty() {
            return Ok(requested.to_vec());
        }
        let systems = self.dependency_systems(name)?;
        Ok(if systems.is_empty() { vec![System::current()] } else { systems })
    }

    /// Fails with [`BindepError::UnsupportedSystem`] when `system` is outside the dependency's
    /// systems. Dependencies without any systems support all of them.
    pub fn check_system(&self, name: &str, system: &System) -> Result<(), BindepError> {
        let systems = self.dependency_systems(name)?;
        if !systems.is_empty() && !systems.contains(system) {
            return Err(BindepError::UnsupportedSystem {
                name: name.to_string(),
                system: system.to_string(),
            });
        }
        Ok(())
    }

    /// Required vars of a dependency that are unset after resolving it for `system`.
    pub fn missing_required_vars(&self, name: &str, system: &System) -> Result<Vec<String>> {
        let required = resolver::with_templates(self, name)?.required_vars;
        if required.is_empty() {
            return Ok(Vec::new());
        }
        let built = self.build_dependency(name, system)?;
        let mut missing: Vec<String> =
            required.into_iter().filter(|var| !built.vars().contains_key(var)).collect();
        missing.sort();
        missing.dedup();
        Ok(missing)
    }

    /// Resolves a dependency and checks it can be installed for `system`.
    pub(crate) fn build_checked(&self, name: &str, system: &System) -> Result<BuiltDependency> {
        self.check_system(name, system)?;
        let missing = self.missing_required_vars(name, system)?;
        if !missing.is_empty() {
            return Err(BindepError::MissingRequiredVars {
                name: name.to_string(),
                vars: missing.join(", "),
            }
            .into());
        }
        self.build_dependency(name, system)
    }
}
