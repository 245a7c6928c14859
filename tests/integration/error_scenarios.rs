//! Exit codes and error messages.

use anyhow::Result;
use predicates::prelude::*;
use std::fs;

use crate::common::{FOO_SCRIPT, TestProject, entries_without_locks};

#[test]
fn test_missing_config() -> Result<()> {
    let project = TestProject::new()?;

    project
        .bindep()
        .args(["install", "foo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no config file found"));
    Ok(())
}

#[test]
fn test_explicit_config_via_env() -> Result<()> {
    let project = TestProject::with_foo()?;
    let other = TestProject::new()?;

    other
        .bindep()
        .env("BINDEP_CONFIG", project.config_path())
        .args(["install", "foo"])
        .assert()
        .success();

    // Relative paths in the config resolve against the config's directory
    assert!(project.bin("foo").exists());
    assert!(!other.bin("foo").exists());
    Ok(())
}

#[test]
fn test_invalid_config() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("dependencies:\n  foo:\n    urls: nope\n")?;

    project
        .bindep()
        .args(["dependency", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("urls"));
    Ok(())
}

#[test]
fn test_unknown_dependency_suggestion() -> Result<()> {
    let project = TestProject::with_foo()?;

    project
        .bindep()
        .args(["install", "fooo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no dependency configured with the name 'fooo'"))
        .stderr(predicate::str::contains("did you mean 'foo'?"));
    Ok(())
}

#[test]
fn test_checksum_mismatch() -> Result<()> {
    let project = TestProject::new()?;
    let (url, _) = project.add_archive("foo.tar.gz", &[("foo", FOO_SCRIPT)])?;
    project.write_config(&format!(
        "dependencies:\n  foo:\n    url: \"{url}\"\nurl_checksums:\n  \"{url}\": {}\n",
        "a".repeat(64)
    ))?;

    project
        .bindep()
        .args(["install", "foo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("checksum mismatch"));

    assert!(!project.bin("foo").exists());
    // Nothing half-populated is left behind
    let downloads = project.cache_dir().join("downloads");
    for entry in entries_without_locks(&downloads) {
        let dir = downloads.join(entry);
        assert_eq!(fs::read_dir(&dir)?.count(), 0, "{} not empty", dir.display());
    }
    Ok(())
}

#[test]
fn test_unsupported_system() -> Result<()> {
    let project = TestProject::new()?;
    let (url, sum) = project.add_archive("foo.tar.gz", &[("foo", FOO_SCRIPT)])?;
    project.write_config(&format!(
        "dependencies:\n  foo:\n    url: \"{url}\"\n    systems: [linux/amd64]\nurl_checksums:\n  \"{url}\": {sum}\n"
    ))?;

    project
        .bindep()
        .args(["install", "foo", "--system", "windows/amd64"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not support system 'windows/amd64'"));
    Ok(())
}

#[test]
fn test_missing_required_vars() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(
        "dependencies:\n  foo:\n    url: https://example.com/foo-{{ version }}.tar.gz\n    required_vars: [version, flavor]\n    vars:\n      version: \"1\"\n",
    )?;

    project
        .bindep()
        .args(["install", "foo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing required vars: flavor"));
    Ok(())
}

#[test]
fn test_missing_binary_in_archive() -> Result<()> {
    let project = TestProject::new()?;
    let (url, sum) = project.add_archive("foo.tar.gz", &[("other", FOO_SCRIPT)])?;
    project.write_config(&format!(
        "dependencies:\n  foo:\n    url: \"{url}\"\nurl_checksums:\n  \"{url}\": {sum}\n"
    ))?;

    project
        .bindep()
        .args(["install", "foo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found in the archive"));
    Ok(())
}

#[test]
fn test_multiple_failures_reported_together() -> Result<()> {
    let project = TestProject::new()?;
    let missing = |name: &str| format!("file://{}", project.dir().join(name).display());
    project.write_config(&format!(
        "dependencies:\n  a:\n    url: \"{}\"\n  b:\n    url: \"{}\"\nurl_checksums:\n  \"{}\": {z}\n  \"{}\": {z}\n",
        missing("a.tar.gz"),
        missing("b.tar.gz"),
        missing("a.tar.gz"),
        missing("b.tar.gz"),
        z = "0".repeat(64)
    ))?;

    project
        .bindep()
        .arg("install")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to install 2 dependencies"))
        .stderr(predicate::str::contains("a:"))
        .stderr(predicate::str::contains("b:"));
    Ok(())
}
