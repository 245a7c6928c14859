//! Common functionality shared by CLI commands.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use super::CliConfig;
use crate::config::Config;
use crate::core::System;
use crate::fetch::DownloadOptions;

/// A loaded config plus the global options it was loaded with.
#[derive(Debug)]
pub struct CommandContext {
    /// The config, with `--cache` and `--install-dir` applied for this run
    pub config: Config,
    /// Where the config was loaded from, for commands that write it back
    pub config_path: PathBuf,
    /// Global CLI options
    pub cli: CliConfig,
    /// `cache` and `install_dir` as the file declares them
    file_dirs: (Option<String>, Option<String>),
}

impl CommandContext {
    /// Finds and loads the config file and applies the global overrides.
    pub fn load(cli: CliConfig) -> Result<Self> {
        let config_path = Config::find(cli.config_path.as_deref())?;
        let mut config = Config::load(&config_path)?;
        let file_dirs = (config.cache.clone(), config.install_dir.clone());

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        if let Some(cache) = &cli.cache {
            config.cache = Some(absolute_from(&cwd, cache));
        }
        if let Some(install_dir) = &cli.install_dir {
            config.install_dir = Some(absolute_from(&cwd, install_dir));
        }

        Ok(Self {
            config,
            config_path,
            cli,
            file_dirs,
        })
    }

    /// Writes the config back to where it was loaded from.
    ///
    /// The directory overrides only apply to the current run and are not written.
    pub fn save(&self) -> Result<()> {
        let mut config = self.config.clone();
        config.cache.clone_from(&self.file_dirs.0);
        config.install_dir.clone_from(&self.file_dirs.1);
        config.write(&self.config_path)
    }
}

/// Flags shared by the commands that download.
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Discard cached copies and download again
    #[arg(short, long)]
    pub force: bool,

    /// Download even when no checksum is recorded for the URL
    #[arg(long)]
    pub allow_missing_checksum: bool,
}

impl FetchArgs {
    /// Download options for these flags.
    pub fn options(&self, cli: &CliConfig) -> DownloadOptions {
        DownloadOptions {
            allow_missing_checksum: self.allow_missing_checksum,
            force: self.force,
            trust_cache: cli.trust_cache,
        }
    }
}

/// `--system` defaulting to the current system.
pub fn system_or_current(system: Option<System>) -> System {
    system.unwrap_or_else(System::current)
}

fn absolute_from(cwd: &Path, path: &Path) -> String {
    let path = if path.is_absolute() { path.to_path_buf() } else { cwd.join(path) };
    path.display().to_string()
}
