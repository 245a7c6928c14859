//! Dependency resolution.
//!
//! Resolution turns a [`Dependency`] declaration plus a target [`System`] into a
//! [`BuiltDependency`]. It is a pure, in-memory transformation of the [`Config`]; nothing is
//! read from disk or the network, and the stored declaration is never modified.
//!
//! # Pipeline
//!
//! 1. Clone the named declaration
//! 2. Layer it over its template chain ([`template`])
//! 3. Apply matching overrides in declaration order ([`overrides`])
//! 4. Default `os`/`arch` vars from the system
//! 5. Apply substitutions, then render `url`, `archive_path` and `bin` ([`interpolate`])
//! 6. Stamp the configured checksum of the rendered URL
//!
//! Matchers see raw values, so a dependency can match `os: [darwin]` while rendering
//! `macOS` into its URL through a substitution.

pub mod interpolate;
pub mod matcher;
pub mod overrides;
pub mod template;

use crate::config::Config;
use crate::core::{BindepError, System};
use crate::models::{BuiltDependency, Dependency};
use std::collections::BTreeMap;

/// Returns the named dependency merged with its templates, before any override is applied.
///
/// # Errors
///
/// [`BindepError::UnknownDependency`] or [`BindepError::UnknownTemplate`].
pub fn with_templates(config: &Config, name: &str) -> Result<Dependency, BindepError> {
    let mut dep = config.dependencies.get(name).cloned().ok_or_else(|| {
        BindepError::UnknownDependency {
            name: name.to_string(),
        }
    })?;
    template::apply_template(&mut dep, &config.templates, 0)?;
    Ok(dep)
}

/// Resolves the named dependency for `system`.
///
/// # Errors
///
/// - [`BindepError::UnknownDependency`] when `name` is not declared
/// - [`BindepError::UnknownTemplate`] when a followed template is missing
/// - [`BindepError::TemplateError`] when a field references an undefined variable
/// - [`BindepError::NoUrl`] when no layer sets a URL
///
/// # Examples
///
/// ```rust
/// use bindep::config::Config;
/// use bindep::core::System;
/// use bindep::models::Dependency;
///
/// let mut config = Config::default();
/// config.dependencies.insert(
///     "foo".to_string(),
///     Dependency {
///         url: Some("https://example.com/foo-{{ os }}-{{ arch }}.tar.gz".to_string()),
///         ..Default::default()
///     },
/// );
///
/// let system = System::new("linux/amd64")?;
/// let built = bindep::resolver::build(&config, "foo", &system)?;
/// assert_eq!(built.url(), "https://example.com/foo-linux-amd64.tar.gz");
/// # Ok::<(), bindep::core::BindepError>(())
/// ```
pub fn build(config: &Config, name: &str, system: &System) -> Result<BuiltDependency, BindepError> {
    let mut dep = with_templates(config, name)?;

    overrides::apply_overrides(&mut dep, system, &BTreeMap::new(), 0);

    dep.vars.entry("os".to_string()).or_insert_with(|| system.os().to_string());
    dep.vars.entry("arch".to_string()).or_insert_with(|| system.arch().to_string());

    interpolate::apply_substitutions(&mut dep.vars, &dep.substitutions);

    let render = |field: &str, value: Option<String>| -> Result<Option<String>, BindepError> {
        value
            .map(|v| {
                interpolate::render(&v, &dep.vars).map_err(|reason| BindepError::TemplateError {
                    name: name.to_string(),
                    field: field.to_string(),
                    reason,
                })
            })
            .transpose()
    };
    let url = render("url", dep.url.clone())?;
    let archive_path = render("archive_path", dep.archive_path.clone())?;
    let bin_name = render("bin", dep.bin_name.clone())?;

    let url = url.ok_or_else(|| BindepError::NoUrl {
        name: name.to_string(),
    })?;
    let checksum = config.url_checksums.get(&url).cloned().unwrap_or_default();

    Ok(BuiltDependency::new(
        name.to_string(),
        system.clone(),
        url,
        archive_path,
        bin_name,
        dep.link.unwrap_or(false),
        dep.vars,
        checksum,
    ))
}
