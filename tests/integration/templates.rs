//! Template sources and `template copy`.

use anyhow::Result;
use predicates::prelude::*;
use std::fs;

use crate::common::{FOO_SCRIPT, TestProject};

const SHARED: &str = r#"
templates:
  base:
    vars:
      flavor: gnu
  release:
    template: base
    url: "{{ prefix }}/foo-{{ flavor }}.tar.gz"
"#;

fn project() -> Result<TestProject> {
    let project = TestProject::new()?;
    fs::write(project.dir().join("shared.yaml"), SHARED)?;
    project.write_config(
        "template_sources:\n  shared: shared.yaml\ndependencies:\n  foo:\n    template: shared#release\n    vars:\n      prefix: https://example.com\n",
    )?;
    Ok(project)
}

#[test]
fn test_template_list() -> Result<()> {
    let project = project()?;

    project
        .bindep()
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shared:"))
        .stdout(predicate::str::contains("shared.yaml"));
    Ok(())
}

#[test]
fn test_unimported_template_fails() -> Result<()> {
    let project = project()?;

    project
        .bindep()
        .args(["dependency", "info", "foo", "--system", "linux/amd64"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no template named 'shared#release'"))
        .stderr(predicate::str::contains("template copy"));
    Ok(())
}

#[test]
fn test_template_copy() -> Result<()> {
    let project = project()?;

    project
        .bindep()
        .args(["template", "copy", "shared", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shared#release"));

    let config = project.read_config()?;
    assert!(config.contains("shared#release"));
    assert!(config.contains("shared#base"));

    project
        .bindep()
        .args(["dependency", "info", "foo", "--system", "linux/amd64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/foo-gnu.tar.gz"));
    Ok(())
}

#[test]
fn test_template_copy_as() -> Result<()> {
    let project = project()?;

    project
        .bindep()
        .args(["template", "copy", "shared", "base", "--as", "gnu-base"])
        .assert()
        .success();

    project
        .bindep()
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gnu-base"));
    Ok(())
}

#[test]
fn test_template_from_file_url_source() -> Result<()> {
    let project = TestProject::new()?;
    let (url, sum) = project.add_archive("foo-gnu.tar.gz", &[("foo", FOO_SCRIPT)])?;
    let source = project.dir().join("remote.json");
    fs::write(
        &source,
        r#"{"templates": {"release": {"url": "{{ prefix }}/foo-gnu.tar.gz"}}}"#,
    )?;
    let prefix = format!("file://{}", project.dir().display());
    project.write_config(&format!(
        "template_sources:\n  remote: \"file://{}\"\ndependencies:\n  foo:\n    template: remote#release\n    vars:\n      prefix: \"{prefix}\"\nurl_checksums:\n  \"{url}\": {sum}\n",
        source.display()
    ))?;

    project.bindep().args(["template", "copy", "remote", "release"]).assert().success();
    project.bindep().args(["install", "foo"]).assert().success();
    assert_eq!(fs::read_to_string(project.bin("foo"))?, FOO_SCRIPT);
    Ok(())
}
