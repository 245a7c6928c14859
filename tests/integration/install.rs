//! Install workflows through the `bindep` binary.

use anyhow::Result;
use predicates::prelude::*;
use std::fs;

use crate::common::{FOO_SCRIPT, TestProject};

#[test]
fn test_install_single_dependency() -> Result<()> {
    let project = TestProject::with_foo()?;

    project
        .bindep()
        .args(["install", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo ->"));

    let installed = project.bin("foo");
    assert_eq!(fs::read_to_string(&installed)?, FOO_SCRIPT);
    #[cfg(unix)]
    assert!(crate::common::is_executable(&installed));
    assert!(!fs::symlink_metadata(&installed)?.file_type().is_symlink());
    Ok(())
}

#[test]
fn test_install_all_by_default() -> Result<()> {
    let project = TestProject::new()?;
    let (foo_url, foo_sum) = project.add_archive("foo.tar.gz", &[("foo", FOO_SCRIPT)])?;
    let (bar_url, bar_sum) = project.add_archive("bar.tar.gz", &[("bin/bar", "#!/bin/sh\necho bar\n")])?;
    project.write_config(&format!(
        r#"dependencies:
  foo:
    url: "{foo_url}"
  bar:
    url: "{bar_url}"
    archive_path: bin/bar
    bin: baz
url_checksums:
  "{foo_url}": {foo_sum}
  "{bar_url}": {bar_sum}
"#
    ))?;

    project.bindep().arg("install").assert().success();

    assert_eq!(fs::read_to_string(project.bin("foo"))?, FOO_SCRIPT);
    assert_eq!(fs::read_to_string(project.bin("baz"))?, "#!/bin/sh\necho bar\n");
    assert!(!project.bin("bar").exists());
    Ok(())
}

#[test]
fn test_reinstall_uses_cache() -> Result<()> {
    let project = TestProject::with_foo()?;
    project.bindep().args(["install", "foo"]).assert().success();

    // With the archive gone only the cache can satisfy the second install
    fs::remove_file(project.dir().join("foo.tar.gz"))?;
    fs::remove_file(project.bin("foo"))?;

    project.bindep().args(["install", "foo"]).assert().success();
    assert_eq!(fs::read_to_string(project.bin("foo"))?, FOO_SCRIPT);

    project
        .bindep()
        .args(["install", "foo", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));
    Ok(())
}

#[test]
fn test_install_output() -> Result<()> {
    let project = TestProject::with_foo()?;

    project
        .bindep()
        .args(["install", "foo", "--output", "tools/my-foo"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(project.dir().join("tools/my-foo"))?, FOO_SCRIPT);
    assert!(!project.bin("foo").exists());
    Ok(())
}

#[test]
fn test_install_output_requires_single_dependency() -> Result<()> {
    let project = TestProject::with_foo()?;

    project
        .bindep()
        .args(["install", "foo", "foo", "--output", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one dependency"));
    Ok(())
}

#[test]
fn test_install_to_cache() -> Result<()> {
    let project = TestProject::with_foo()?;

    let output = project.bindep().args(["install", "foo", "--to-cache"]).output()?;
    assert!(output.status.success());

    let path = String::from_utf8(output.stdout)?;
    let path = path.trim();
    assert!(path.contains(".bindep"), "unexpected cache path: {path}");
    assert!(path.ends_with("bin/foo"));
    assert_eq!(fs::read_to_string(path)?, FOO_SCRIPT);
    assert!(!project.bin("foo").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_install_link() -> Result<()> {
    let project = TestProject::new()?;
    let (url, sum) = project.add_archive("foo.tar.gz", &[("foo", FOO_SCRIPT)])?;
    project.write_config(&format!(
        "dependencies:\n  foo:\n    url: \"{url}\"\n    link: true\nurl_checksums:\n  \"{url}\": {sum}\n"
    ))?;

    project.bindep().args(["install", "foo"]).assert().success();

    let installed = project.bin("foo");
    let link = fs::read_link(&installed)?;
    assert!(link.is_relative(), "expected a relative link, got {}", link.display());
    assert!(link.to_string_lossy().contains(".bindep"));
    assert_eq!(fs::read_to_string(&installed)?, FOO_SCRIPT);
    assert!(crate::common::is_executable(&installed));
    Ok(())
}

#[test]
fn test_install_for_other_system() -> Result<()> {
    let project = TestProject::new()?;
    let (linux_url, linux_sum) = project.add_archive("foo-linux.tar.gz", &[("foo", "linux")])?;
    let (mac_url, mac_sum) = project.add_archive("foo-macOS.tar.gz", &[("foo", "mac")])?;
    let base = project.dir().display().to_string();
    project.write_config(&format!(
        r#"systems: [linux/amd64, darwin/arm64]
dependencies:
  foo:
    url: "file://{base}/foo-{{{{ os }}}}.tar.gz"
    substitutions:
      os:
        darwin: macOS
url_checksums:
  "{linux_url}": {linux_sum}
  "{mac_url}": {mac_sum}
"#
    ))?;

    project
        .bindep()
        .args(["install", "foo", "--system", "darwin/arm64", "--output", "foo-mac"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(project.dir().join("foo-mac"))?, "mac");

    project
        .bindep()
        .args(["install", "foo", "--system", "linux/amd64", "--output", "foo-linux"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(project.dir().join("foo-linux"))?, "linux");
    Ok(())
}

#[test]
fn test_download_and_extract_print_cache_paths() -> Result<()> {
    let project = TestProject::with_foo()?;

    let output = project.bindep().args(["download", "foo"]).output()?;
    assert!(output.status.success());
    let downloaded = String::from_utf8(output.stdout)?;
    assert!(downloaded.trim().ends_with("foo.tar.gz"));
    assert!(downloaded.contains("downloads"));

    let output = project.bindep().args(["extract", "foo"]).output()?;
    assert!(output.status.success());
    let extracted = String::from_utf8(output.stdout)?;
    let extracted = std::path::Path::new(extracted.trim());
    assert!(extracted.to_string_lossy().contains("extracts"));
    assert_eq!(fs::read_to_string(extracted.join("bin/foo"))?, FOO_SCRIPT);
    Ok(())
}

#[test]
fn test_install_dir_override() -> Result<()> {
    let project = TestProject::with_foo()?;

    project
        .bindep()
        .args(["install", "foo", "--install-dir", "tools", "--cache", "cache"])
        .assert()
        .success();

    assert!(project.dir().join("tools/foo").exists());
    assert!(project.dir().join("cache/downloads").is_dir());
    assert!(!project.cache_dir().exists());
    Ok(())
}
