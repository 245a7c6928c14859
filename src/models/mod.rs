//! Dependency declarations and their resolved form.
//!
//! A [`Dependency`] is what users write in the config: every scalar is optional so that
//! templates and overrides can tell "not specified" apart from "specified as empty". A
//! [`BuiltDependency`] is what the resolver produces for one [`System`]; it is the only type
//! the fetch pipeline accepts, so an unresolved declaration can never be downloaded.

use crate::core::System;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-variable value rewrites: `var -> (raw value -> rendered value)`.
pub type Substitutions = BTreeMap<String, BTreeMap<String, String>>;

/// A declarative description of a downloadable binary.
///
/// ```yaml
/// template: goreleaser
/// url: https://example.com/foo-{{ version }}-{{ os }}-{{ arch }}.tar.gz
/// archive_path: foo
/// vars:
///   version: 1.2.3
/// substitutions:
///   os:
///     darwin: macOS
/// overrides:
///   - matcher:
///       os: [windows]
///     dependency:
///       archive_path: foo.exe
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    /// Template to inherit from, optionally qualified as `source#name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// URL template of the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Path of the binary inside the extracted archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,

    /// Name of the installed binary
    #[serde(default, rename = "bin", skip_serializing_if = "Option::is_none")]
    pub bin_name: Option<String>,

    /// Install as a symlink into the cache instead of a copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<bool>,

    /// Template variables
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,

    /// Systems this dependency supports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<System>,

    /// Variables that must be set for the dependency to be usable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_vars: Vec<String>,

    /// Conditional partial dependencies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<DependencyOverride>,

    /// Value rewrites applied before interpolation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub substitutions: Substitutions,
}

/// A partial [`Dependency`] applied when its matcher matches the resolution target.
///
/// Matcher keys are `os`, `arch` or any variable name; each maps to a list of acceptable
/// patterns. An empty matcher matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyOverride {
    /// Variable name to acceptable patterns
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub matcher: BTreeMap<String, Vec<String>>,

    /// Fields applied on match
    #[serde(default)]
    pub dependency: Dependency,
}

impl DependencyOverride {
    /// Creates an override from `(key, patterns)` pairs.
    pub fn new<K, P>(matcher: impl IntoIterator<Item = (K, Vec<P>)>, dependency: Dependency) -> Self
    where
        K: Into<String>,
        P: Into<String>,
    {
        Self {
            matcher: matcher
                .into_iter()
                .map(|(k, patterns)| (k.into(), patterns.into_iter().map(Into::into).collect()))
                .collect(),
            dependency,
        }
    }
}

/// A dependency fully resolved for one system.
///
/// Constructed only by [`crate::resolver::build`]. Every string field is interpolated and
/// `checksum` is the configured checksum of `url` (empty when none is configured).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltDependency {
    name: String,
    system: System,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    archive_path: Option<String>,
    #[serde(rename = "bin", skip_serializing_if = "Option::is_none")]
    bin_name: Option<String>,
    link: bool,
    vars: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    checksum: String,
}

impl BuiltDependency {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        system: System,
        url: String,
        archive_path: Option<String>,
        bin_name: Option<String>,
        link: bool,
        vars: BTreeMap<String, String>,
        checksum: String,
    ) -> Self {
        Self {
            name,
            system,
            url,
            archive_path,
            bin_name,
            link,
            vars,
            checksum,
        }
    }

    /// The dependency's name in the config.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The system this dependency was built for.
    pub fn system(&self) -> &System {
        &self.system
    }

    /// The resolved download URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The interpolated archive path, if one was declared.
    pub fn archive_path(&self) -> Option<&str> {
        self.archive_path.as_deref()
    }

    /// The interpolated binary name, if one was declared.
    pub fn bin_name(&self) -> Option<&str> {
        self.bin_name.as_deref()
    }

    /// Whether the binary is installed as a symlink.
    pub fn link(&self) -> bool {
        self.link
    }

    /// The final variables after overrides and substitutions.
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// The configured checksum, empty when unknown.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// The name the binary is installed under: `bin`, falling back to the dependency name.
    pub fn installed_name(&self) -> &str {
        self.bin_name.as_deref().unwrap_or(&self.name)
    }

    /// The binary's path relative to the extracted archive.
    pub fn source_path(&self) -> &str {
        self.archive_path.as_deref().or(self.bin_name.as_deref()).unwrap_or(&self.name)
    }

    /// The file name of the download: the URL's final path segment.
    pub fn file_name(&self) -> &str {
        let without_query = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        let name = without_query.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        if name.is_empty() { "download" } else { name }
    }
}
