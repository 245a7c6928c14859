//! Override matchers.
//!
//! A matcher maps variable names to acceptable patterns. A pattern accepts a value when the
//! two are equal, or when the pattern is a version requirement (`1.x`, `>=1.2, <2`,
//! `^1 || ^2`) that the value, read as a semantic version, satisfies. A bare version such
//! as `1.2.3` is never treated as a requirement, so it only matches the exact string.

use semver::{Version, VersionReq};
use std::collections::BTreeMap;

/// Returns true when every key of `matcher` has a pattern accepting the value in `vars`.
///
/// A key absent from `vars` fails the match. An empty matcher matches unconditionally.
pub fn matches(matcher: &BTreeMap<String, Vec<String>>, vars: &BTreeMap<String, String>) -> bool {
    matcher.iter().all(|(key, patterns)| match vars.get(key) {
        Some(value) => patterns.iter().any(|pattern| pattern_matches(pattern, value)),
        None => false,
    })
}

/// Tests a single pattern against a single value.
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == value {
        return true;
    }

    let Some(version) = parse_version(value) else {
        return false;
    };

    // An exact version is an equality pattern, already handled above
    if parse_version(pattern).is_some() {
        return false;
    }

    pattern
        .split("||")
        .map(str::trim)
        .any(|alternative| match VersionReq::parse(alternative) {
            Ok(req) => req.matches(&version),
            Err(_) => false,
        })
}

fn parse_version(value: &str) -> Option<Version> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn matcher(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, ps)| (k.to_string(), ps.iter().map(|p| p.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_exact_match() {
        assert!(pattern_matches("linux", "linux"));
        assert!(!pattern_matches("linux", "darwin"));
    }

    #[test]
    fn test_semver_range() {
        assert!(pattern_matches("1.x", "1.2.3"));
        assert!(!pattern_matches("1.x", "2.0.0"));
        assert!(pattern_matches(">=1.2, <2", "1.9.0"));
        assert!(pattern_matches("^1 || ^3", "3.1.0"));
        assert!(!pattern_matches("^1 || ^3", "2.1.0"));
        assert!(pattern_matches("1.x", "v1.4.0"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(pattern_matches("1.2.3", "1.2.3"));
        assert!(!pattern_matches("1.2.3", "1.5.0"));
        assert!(!pattern_matches("1.2.3", "1.2.4"));
    }

    #[test]
    fn test_unparsable_falls_back_to_equality() {
        assert!(!pattern_matches("1.x", "latest"));
        assert!(!pattern_matches("not a range", "1.0.0"));
        assert!(pattern_matches("not a range", "not a range"));
    }

    #[test]
    fn test_matcher_requires_every_key() {
        let m = matcher(&[("os", &["linux", "darwin"]), ("arch", &["amd64"])]);
        assert!(matches(&m, &vars(&[("os", "darwin"), ("arch", "amd64")])));
        assert!(!matches(&m, &vars(&[("os", "darwin"), ("arch", "arm64")])));
        assert!(!matches(&m, &vars(&[("os", "darwin")])));
    }

    #[test]
    fn test_version_matcher() {
        let m = matcher(&[("version", &["1.x"])]);
        assert!(matches(&m, &vars(&[("version", "1.2.3")])));
        assert!(!matches(&m, &vars(&[("version", "2.0.0")])));

        let m = matcher(&[("version", &["1.2.3"])]);
        assert!(matches(&m, &vars(&[("version", "1.2.3")])));
        assert!(!matches(&m, &vars(&[("version", "1.2.4")])));
    }

    #[test]
    fn test_empty_matcher_matches() {
        assert!(matches(&BTreeMap::new(), &BTreeMap::new()));
    }
}
