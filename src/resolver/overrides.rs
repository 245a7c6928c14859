//! Conditional overrides.
//!
//! Overrides are evaluated in declaration order against the variables as they stand when the
//! override is reached, so a later matching override can replace fields an earlier one set.
//! Matchers always see raw values; substitutions are applied only after this step.

use crate::core::System;
use crate::models::Dependency;
use crate::resolver::matcher;
use std::collections::BTreeMap;

/// Nesting levels of overrides that are evaluated.
pub const MAX_OVERRIDE_DEPTH: usize = 2;

/// Applies every matching override of `dep` for `system` and clears the override list.
///
/// `inherited` holds variables of the enclosing dependency when `dep` is itself the body of a
/// matched override; callers start with an empty map at depth 0. Nested overrides are matched
/// against the vars snapshot taken when their enclosing override matched, plus the body's own
/// vars, so vars set by later overrides of the enclosing dependency are not visible to them.
pub fn apply_overrides(
    dep: &mut Dependency,
    system: &System,
    inherited: &BTreeMap<String, String>,
    depth: usize,
) {
    let overrides = std::mem::take(&mut dep.overrides);
    if depth >= MAX_OVERRIDE_DEPTH {
        return;
    }

    for candidate in overrides {
        let snapshot = match_vars(inherited, &dep.vars, system);
        if !matcher::matches(&candidate.matcher, &snapshot) {
            continue;
        }

        let mut body = candidate.dependency;
        apply_overrides(&mut body, system, &snapshot, depth + 1);
        merge(dep, body);
    }
}

/// The variables a matcher sees: inherited and current vars plus `os`/`arch` defaults.
fn match_vars(
    inherited: &BTreeMap<String, String>,
    vars: &BTreeMap<String, String>,
    system: &System,
) -> BTreeMap<String, String> {
    let mut snapshot = inherited.clone();
    snapshot.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    snapshot.entry("os".to_string()).or_insert_with(|| system.os().to_string());
    snapshot.entry("arch".to_string()).or_insert_with(|| system.arch().to_string());
    snapshot
}

/// Merges a matched override body into `dep`; the body's set fields win.
fn merge(dep: &mut Dependency, body: Dependency) {
    for (var, table) in body.substitutions {
        dep.substitutions.entry(var).or_default().extend(table);
    }
    if body.link.is_some() {
        dep.link = body.link;
    }
    if body.archive_path.is_some() {
        dep.archive_path = body.archive_path;
    }
    if body.bin_name.is_some() {
        dep.bin_name = body.bin_name;
    }
    if body.url.is_some() {
        dep.url = body.url;
    }
    dep.vars.extend(body.vars);
}
