//! `dependency list`, `dependency info` and `dependency systems`.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

const CONFIG: &str = r#"
systems: [linux/amd64, linux/arm64, darwin/arm64]
templates:
  release:
    url: https://example.com/{{ name }}-{{ version }}-{{ os }}-{{ arch }}.tar.gz
    vars:
      version: "1.0"
dependencies:
  foo:
    template: release
    vars:
      name: foo
    systems: [linux/amd64, linux/arm64]
    overrides:
      - matcher:
          arch: [arm64]
        dependency:
          vars:
            version: "1.1"
  bar:
    template: release
    vars:
      name: bar
"#;

#[test]
fn test_dependency_list() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(CONFIG)?;

    project
        .bindep()
        .args(["dependency", "list"])
        .assert()
        .success()
        .stdout(predicate::eq("bar\nfoo\n"));
    Ok(())
}

#[test]
fn test_dependency_info() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(CONFIG)?;

    project
        .bindep()
        .args(["dependency", "info", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/foo-1.0-linux-amd64.tar.gz"))
        .stdout(predicate::str::contains("https://example.com/foo-1.1-linux-arm64.tar.gz"))
        .stdout(predicate::str::contains("darwin").not());

    project
        .bindep()
        .args(["dependency", "info", "bar", "--system", "darwin/arm64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("system: darwin/arm64"))
        .stdout(predicate::str::contains("https://example.com/bar-1.0-darwin-arm64.tar.gz"));
    Ok(())
}

#[test]
fn test_dependency_systems() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(CONFIG)?;

    project
        .bindep()
        .args(["dependency", "systems", "foo"])
        .assert()
        .success()
        .stdout(predicate::eq("linux/amd64\nlinux/arm64\n"));

    project
        .bindep()
        .args(["dependency", "systems", "bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("darwin/arm64"));
    Ok(())
}
