//! Template inheritance.
//!
//! A dependency names a template; the template's fields form the base layer and the
//! dependency's own fields are layered on top. Templates may themselves name a template, but
//! only two layers are followed (dependency -> template -> template). Anything deeper is
//! ignored without error.

use crate::core::BindepError;
use crate::models::Dependency;
use std::collections::BTreeMap;

/// Number of template layers followed below a dependency.
pub const MAX_TEMPLATE_DEPTH: usize = 2;

/// Applies `dep.template` (recursively) to `dep`.
///
/// `depth` is the number of template layers already applied above `dep`; callers start at 0.
///
/// # Errors
///
/// [`BindepError::UnknownTemplate`] when a followed layer names a template missing from
/// `templates`.
pub fn apply_template(
    dep: &mut Dependency,
    templates: &BTreeMap<String, Dependency>,
    depth: usize,
) -> Result<(), BindepError> {
    if depth >= MAX_TEMPLATE_DEPTH {
        return Ok(());
    }
    let Some(name) = dep.template.as_deref().filter(|name| !name.is_empty()) else {
        return Ok(());
    };

    let mut base = templates
        .get(name)
        .cloned()
        .ok_or_else(|| BindepError::UnknownTemplate {
            name: name.to_string(),
        })?;
    apply_template(&mut base, templates, depth + 1)?;

    let child = std::mem::take(dep);
    *dep = layer(base, child);
    Ok(())
}

/// Layers `child` on top of `base`.
fn layer(mut base: Dependency, child: Dependency) -> Dependency {
    if child.url.is_some() {
        base.url = child.url;
    }
    if child.archive_path.is_some() {
        base.archive_path = child.archive_path;
    }
    if child.bin_name.is_some() {
        base.bin_name = child.bin_name;
    }
    if child.link.is_some() {
        base.link = child.link;
    }
    if !child.systems.is_empty() {
        base.systems = child.systems;
    }

    base.vars.extend(child.vars);
    base.required_vars.extend(child.required_vars);
    base.overrides.extend(child.overrides);
    for (var, table) in child.substitutions {
        base.substitutions.entry(var).or_default().extend(table);
    }

    // The merged result no longer refers to any template
    base.template = None;
    base
}
