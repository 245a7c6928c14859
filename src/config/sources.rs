//! Importing templates from other config documents.
//!
//! `template_sources` names other configs, local or remote. Copying a template from one stores it
//! in the local template table, by default as `source#template`, so dependencies can refer to
//! it the same way they refer to local templates. A parent template the copied one builds on is
//! imported alongside it.

use super::{Config, Format};
use crate::core::BindepError;
use crate::fetch::Fetcher;
use anyhow::{Context, Result};
use std::io::Read;
use tracing::{debug, info};

/// Separates a source name from a template name.
pub const SOURCE_SEPARATOR: char = '#';

impl Config {
    /// Loads the config document behind the template source `source`.
    pub fn load_template_source(&self, source: &str, fetcher: &dyn Fetcher) -> Result<Config> {
        let location = self.template_sources.get(source).ok_or_else(|| BindepError::ConfigError {
            message: format!("no template source named '{source}'"),
        })?;

        if is_url(location) {
            debug!(source, url = %location, "Fetching template source");
            let mut body = fetcher.get(location)?.into_body(location)?;
            let mut content = String::new();
            body.read_to_string(&mut content)
                .with_context(|| format!("Failed to read template source {location}"))?;
            let without_query = location.split(['?', '#']).next().unwrap_or(location);
            let format = Format::detect(without_query, Some(&content));
            return Config::parse(&content, format)
                .with_context(|| format!("Invalid template source '{source}' at {location}"));
        }

        let path = self.resolve_path(location)?;
        Config::load(&path).with_context(|| format!("Failed to load template source '{source}'"))
    }

    /// Copies `template` from the template source `source` into the local templates.
    ///
    /// The copy is stored as `dest`, defaulting to `source#template`, and its name is returned.
    /// A template the copied one builds on is imported as `source#parent` unless the local
    /// config already has a template by that name.
    ///
    /// # Errors
    ///
    /// [`BindepError::ConfigError`] for an unknown source, [`BindepError::UnknownTemplate`] when
    /// the source has no such template, or the error loading the source.
    pub fn copy_template_from_source(
        &mut self,
        source: &str,
        template: &str,
        dest: Option<&str>,
        fetcher: &dyn Fetcher,
    ) -> Result<String> {
        let remote = self.load_template_source(source, fetcher)?;
        let mut copied = remote.templates.get(template).cloned().ok_or_else(|| {
            BindepError::UnknownTemplate {
                name: qualified(source, template),
            }
        })?;

        if let Some(parent) = copied.template.take() {
            let parent_name = qualified(source, &parent);
            if !self.templates.contains_key(&parent_name) {
                let parent_template = remote.templates.get(&parent).cloned().ok_or_else(|| {
                    BindepError::UnknownTemplate {
                        name: parent_name.clone(),
                    }
                })?;
                // Deeper levels are never applied, so the grandparent reference is dropped
                self.templates.insert(parent_name.clone(), crate::models::Dependency {
                    template: None,
                    ..parent_template
                });
            }
            copied.template = Some(parent_name);
        }

        let name = dest.map_or_else(|| qualified(source, template), str::to_string);
        info!(source, template, dest = %name, "Copied template");
        self.templates.insert(name.clone(), copied);
        Ok(name)
    }
}

/// `source#name`.
pub fn qualified(source: &str, name: &str) -> String {
    format!("{source}{SOURCE_SEPARATOR}{name}")
}

fn is_url(location: &str) -> bool {
    ["http://", "https://", "file://"].iter().any(|scheme| location.starts_with(scheme))
}
