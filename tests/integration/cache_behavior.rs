//! Cache reuse, repair and concurrency.

use anyhow::Result;
use bindep::cache::seal::unseal;
use bindep::config::{Config, InstallOptions};
use bindep::core::System;
use bindep::models::Dependency;
use bindep::test_utils::{CountingFetcher, sha256_hex, tarball};
use predicates::prelude::*;
use std::fs;
use std::process::Command;

use crate::common::{FOO_SCRIPT, TestProject, entries_without_locks};

#[test]
fn test_concurrent_processes_share_cache() -> Result<()> {
    let project = TestProject::with_foo()?;

    let children = (0..6)
        .map(|i| {
            Command::new(env!("CARGO_BIN_EXE_bindep"))
                .current_dir(project.dir())
                .env("BINDEP_NO_PROGRESS", "true")
                .env_remove("BINDEP_CACHE")
                .env_remove("BINDEP_CONFIG")
                .args(["install", "foo", "--output", &format!("out/foo-{i}")])
                .spawn()
        })
        .collect::<std::io::Result<Vec<_>>>()?;

    for child in children {
        let output = child.wait_with_output()?;
        assert!(output.status.success(), "install failed: {output:?}");
    }

    for i in 0..6 {
        assert_eq!(fs::read_to_string(project.dir().join(format!("out/foo-{i}")))?, FOO_SCRIPT);
    }
    assert_eq!(entries_without_locks(&project.cache_dir().join("downloads")).len(), 1);
    assert_eq!(entries_without_locks(&project.cache_dir().join("extracts")).len(), 2);
    Ok(())
}

#[test]
fn test_concurrent_threads_download_once() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let url = "https://example.com/foo.tar.gz";
    let archive = tarball(&[("foo", FOO_SCRIPT)]);

    let mut config = Config::default();
    config.set_base_dir(temp.path());
    config.dependencies.insert("foo".to_string(), Dependency {
        url: Some(url.to_string()),
        ..Default::default()
    });
    config.url_checksums.insert(url.to_string(), sha256_hex(&archive));
    let fetcher = CountingFetcher::new().with_body(url, archive);
    let system = System::new("linux/amd64")?;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let config = &config;
                let fetcher = &fetcher;
                let system = &system;
                let output = temp.path().join(format!("out/foo-{i}"));
                scope.spawn(move || {
                    config.install_dependency(
                        "foo",
                        system,
                        &InstallOptions {
                            output: Some(output),
                            ..Default::default()
                        },
                        fetcher,
                    )
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("install thread panicked").expect("install failed");
        }
    });

    assert_eq!(fetcher.count(), 1);
    for i in 0..8 {
        assert_eq!(fs::read_to_string(temp.path().join(format!("out/foo-{i}")))?, FOO_SCRIPT);
    }
    Ok(())
}

#[test]
fn test_corrupt_download_is_replaced() -> Result<()> {
    let project = TestProject::with_foo()?;
    project.bindep().args(["install", "foo"]).assert().success();

    let downloads = project.cache_dir().join("downloads");
    let entries = entries_without_locks(&downloads);
    assert_eq!(entries.len(), 1);
    let entry = downloads.join(&entries[0]);
    let cached = entry.join("foo.tar.gz");
    let original = fs::read(&cached)?;

    unseal(&entry);
    fs::write(&cached, "corrupt")?;

    // Trusted entries are used without re-hashing
    project.bindep().args(["download", "foo", "--trust-cache"]).assert().success();
    assert_eq!(fs::read(&cached)?, b"corrupt");

    project.bindep().args(["download", "foo"]).assert().success();
    assert_eq!(fs::read(&cached)?, original);
    Ok(())
}

#[test]
fn test_cache_clear() -> Result<()> {
    let project = TestProject::with_foo()?;
    project.bindep().args(["install", "foo"]).assert().success();
    assert!(!entries_without_locks(&project.cache_dir().join("extracts")).is_empty());

    project
        .bindep()
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared"));

    for cache in ["downloads", "extracts"] {
        let root = project.cache_dir().join(cache);
        assert!(entries_without_locks(&root).is_empty(), "{cache} not cleared");
        assert!(root.join(".locks").join(".root").exists());
    }

    // Copies don't point into the cache
    assert_eq!(fs::read_to_string(project.bin("foo"))?, FOO_SCRIPT);
    project.bindep().args(["install", "foo"]).assert().success();
    Ok(())
}
