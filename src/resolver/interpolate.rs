//! Substitution and interpolation of dependency fields.
//!
//! Fields are rendered with Tera, so `https://example.com/{{ version }}/foo-{{ os }}.tar.gz`
//! reads each variable from the dependency's vars. Rendering is strict: an undefined variable
//! fails the build instead of producing a partially rendered URL.

use std::collections::BTreeMap;
use std::error::Error as _;
use tera::{Context as TeraContext, Tera};

use crate::models::Substitutions;

/// Rewrites each variable through its substitution table, when one has an entry for it.
pub fn apply_substitutions(vars: &mut BTreeMap<String, String>, substitutions: &Substitutions) {
    for (var, value) in vars.iter_mut() {
        if let Some(replacement) = substitutions.get(var).and_then(|table| table.get(value.as_str())) {
            *value = replacement.clone();
        }
    }
}

/// Renders `input` with `vars` in scope.
///
/// Returns the Tera error message (including its causes) on failure.
pub fn render(input: &str, vars: &BTreeMap<String, String>) -> Result<String, String> {
    // Skip the engine when there is nothing to render
    if !input.contains("{{") && !input.contains("{%") && !input.contains("{#") {
        return Ok(input.to_string());
    }

    let mut context = TeraContext::new();
    for (key, value) in vars {
        context.insert(key.as_str(), value);
    }

    Tera::one_off(input, &context, false).map_err(|e| {
        let mut message = e.to_string();
        let mut source = e.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    })
}
