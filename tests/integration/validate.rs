//! The `validate` command.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::{FOO_SCRIPT, TestProject};

#[test]
fn test_validate_success() -> Result<()> {
    let project = TestProject::with_foo()?;

    project
        .bindep()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 dependency/system pairs valid"));

    // Validation never touches the real cache or install directory
    assert!(!project.cache_dir().exists());
    assert!(!project.bin("foo").exists());
    Ok(())
}

#[test]
fn test_validate_every_system() -> Result<()> {
    let project = TestProject::new()?;
    let (linux_url, linux_sum) = project.add_archive("foo-linux.tar.gz", &[("foo", FOO_SCRIPT)])?;
    let (darwin_url, _) = project.add_archive("foo-darwin.tar.gz", &[("foo", FOO_SCRIPT)])?;
    let base = project.dir().display().to_string();
    project.write_config(&format!(
        "systems: [linux/amd64, darwin/arm64]\ndependencies:\n  foo:\n    url: \"file://{base}/foo-{{{{ os }}}}.tar.gz\"\nurl_checksums:\n  \"{linux_url}\": {linux_sum}\n  \"{darwin_url}\": {}\n",
        "f".repeat(64)
    ))?;

    project
        .bindep()
        .arg("validate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("foo (darwin/arm64)"))
        .stdout(predicate::str::contains("checksum mismatch"))
        .stdout(predicate::str::contains("linux/amd64").not())
        .stderr(predicate::str::contains("1 of 2 dependency/system pairs failed validation"));

    project
        .bindep()
        .args(["validate", "foo", "--system", "linux/amd64"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_validate_reports_all_failures() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(
        "dependencies:\n  a:\n    url: https://example.com/a-{{ missing }}.tar.gz\n  b:\n    archive_path: b\n",
    )?;

    project
        .bindep()
        .arg("validate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("a ("))
        .stdout(predicate::str::contains("b ("))
        .stdout(predicate::str::contains("no URL configured"));
    Ok(())
}
