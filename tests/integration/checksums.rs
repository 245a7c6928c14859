//! `checksums add` and `checksums prune`.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::{FOO_SCRIPT, TestProject};

fn project_without_checksum() -> Result<(TestProject, String, String)> {
    let project = TestProject::new()?;
    let (url, sum) = project.add_archive("foo.tar.gz", &[("foo", FOO_SCRIPT)])?;
    project.write_config(&format!("dependencies:\n  foo:\n    url: \"{url}\"\n"))?;
    Ok((project, url, sum))
}

#[test]
fn test_install_requires_checksum() -> Result<()> {
    let (project, _, _) = project_without_checksum()?;

    project
        .bindep()
        .args(["install", "foo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no checksum configured for 'foo'"))
        .stderr(predicate::str::contains("checksums add foo"));

    project.bindep().args(["install", "foo", "--allow-missing-checksum"]).assert().success();
    assert!(project.bin("foo").exists());
    Ok(())
}

#[test]
fn test_checksums_add() -> Result<()> {
    let (project, url, sum) = project_without_checksum()?;

    project
        .bindep()
        .args(["checksums", "add"])
        .assert()
        .success()
        .stdout(predicate::str::contains(url.as_str()))
        .stdout(predicate::str::contains("Added 1 checksums"));

    let config = project.read_config()?;
    assert!(config.contains("url_checksums"));
    assert!(config.contains(&sum));

    project.bindep().args(["install", "foo"]).assert().success();

    // Nothing left to add
    project
        .bindep()
        .args(["checksums", "add"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 0 checksums"));
    Ok(())
}

#[test]
fn test_checksums_add_does_not_persist_directory_overrides() -> Result<()> {
    let (project, _, sum) = project_without_checksum()?;

    project
        .bindep()
        .args(["--cache", "runcache", "--install-dir", "runbin", "checksums", "add"])
        .assert()
        .success();

    let config = project.read_config()?;
    assert!(config.contains(&sum));
    assert!(!config.contains("runcache"));
    assert!(!config.contains("runbin"));

    let (project, _, sum) = project_without_checksum()?;
    project
        .bindep()
        .env("BINDEP_CACHE", project.dir().join("envcache"))
        .args(["checksums", "add"])
        .assert()
        .success();

    let config = project.read_config()?;
    assert!(config.contains(&sum));
    assert!(!config.contains("envcache"));
    Ok(())
}

#[test]
fn test_checksums_add_for_every_system() -> Result<()> {
    let project = TestProject::new()?;
    let (linux_url, linux_sum) = project.add_archive("foo-linux.tar.gz", &[("foo", "linux")])?;
    let (darwin_url, darwin_sum) = project.add_archive("foo-darwin.tar.gz", &[("foo", "darwin")])?;
    let base = project.dir().display().to_string();
    project.write_config(&format!(
        "systems: [linux/amd64, darwin/arm64]\ndependencies:\n  foo:\n    url: \"file://{base}/foo-{{{{ os }}}}.tar.gz\"\n"
    ))?;

    project.bindep().args(["checksums", "add"]).assert().success();

    let config = project.read_config()?;
    assert!(config.contains(&linux_url) && config.contains(&linux_sum));
    assert!(config.contains(&darwin_url) && config.contains(&darwin_sum));
    Ok(())
}

#[test]
fn test_checksums_add_unreachable_url() -> Result<()> {
    let project = TestProject::new()?;
    let missing = format!("file://{}", project.dir().join("missing.tar.gz").display());
    project.write_config(&format!("dependencies:\n  foo:\n    url: \"{missing}\"\n"))?;
    let before = project.read_config()?;

    project
        .bindep()
        .args(["checksums", "add"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("status 404"));
    assert_eq!(project.read_config()?, before);
    Ok(())
}

#[test]
fn test_checksums_prune() -> Result<()> {
    let project = TestProject::new()?;
    let (url, sum) = project.add_archive("foo.tar.gz", &[("foo", FOO_SCRIPT)])?;
    project.write_config(&format!(
        "dependencies:\n  foo:\n    url: \"{url}\"\nurl_checksums:\n  \"{url}\": {sum}\n  https://example.com/old.tar.gz: {}\n",
        "0".repeat(64)
    ))?;

    project
        .bindep()
        .args(["checksums", "prune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/old.tar.gz"))
        .stdout(predicate::str::contains("Pruned 1 checksums"));

    let config = project.read_config()?;
    assert!(!config.contains("old.tar.gz"));
    assert!(config.contains(&sum));
    Ok(())
}
