//! Command-line interface for bindep.
//!
//! # Commands
//!
//! - `install` - download, extract and install dependencies (in parallel)
//! - `download` / `extract` - run the first pipeline stages and print the cached path
//! - `checksums` - record or prune `url_checksums`
//! - `validate` - run the whole pipeline against a scratch cache
//! - `dependency` - list and inspect dependencies
//! - `template` - list templates and copy them from template sources
//! - `cache` - clear the cache
//!
//! # Global Options
//!
//! - `--configfile` (`BINDEP_CONFIG`) - config file to use
//! - `--cache` (`BINDEP_CACHE`) / `--install-dir` - override the config's directories
//! - `--trust-cache` (`BINDEP_TRUST_CACHE`) - skip re-validating cache entries
//! - `--verbose` / `--quiet` - log level, unless `RUST_LOG` is set
//! - `--no-progress` (`BINDEP_NO_PROGRESS`) - disable spinners
//!
//! # Example
//!
//! ```bash
//! bindep install foo bar
//! bindep install foo --system darwin/arm64 --output ./foo-mac
//! bindep checksums add
//! ```

mod cache;
pub mod common;
mod dependency;
mod download;
mod install;
mod template;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::constants::{CACHE_ENV, CONFIG_ENV, NO_PROGRESS_ENV, TRUST_CACHE_ENV};
use crate::core::error::{BindepError, user_friendly_error, with_similar_names};
use common::CommandContext;

/// Global options resolved from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,

    /// Disable spinners
    pub no_progress: bool,

    /// Explicit config file
    pub config_path: Option<PathBuf>,

    /// Cache directory override
    pub cache: Option<PathBuf>,

    /// Install directory override
    pub install_dir: Option<PathBuf>,

    /// Accept existing cache entries without re-validating them
    pub trust_cache: bool,
}

impl CliConfig {
    /// Installs the global `tracing` subscriber. `RUST_LOG` wins over `log_level`.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("bindep={}", self.log_level)));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }

    /// Whether spinners should be drawn.
    pub fn progress(&self) -> bool {
        !self.no_progress
    }
}

/// Reproducible binary dependency downloads.
#[derive(Parser, Debug)]
#[command(
    name = "bindep",
    about = "Download, verify and install binary dependencies",
    version,
    long_about = "bindep resolves declared binary dependencies for a platform, downloads them \
                  into a checksum-verified cache shared between concurrent runs, and installs \
                  the selected binary."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: bindep.yaml, bindep.yml or bindep.json)
    #[arg(long, global = true, env = CONFIG_ENV)]
    configfile: Option<PathBuf>,

    /// Cache directory
    #[arg(long, global = true, env = CACHE_ENV)]
    cache: Option<PathBuf>,

    /// Directory binaries are installed to
    #[arg(long, global = true)]
    install_dir: Option<PathBuf>,

    /// Accept cached files without re-hashing them
    #[arg(long, global = true, env = TRUST_CACHE_ENV)]
    trust_cache: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress spinners
    #[arg(long, global = true, env = NO_PROGRESS_ENV)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install dependencies
    Install(install::InstallCommand),

    /// Download a dependency into the cache and print its path
    Download(download::DownloadCommand),

    /// Download and extract a dependency and print the extracted directory
    Extract(download::ExtractCommand),

    /// Manage recorded URL checksums
    Checksums(validate::ChecksumsCommand),

    /// Check that dependencies download, verify and install
    Validate(validate::ValidateCommand),

    /// Inspect dependencies
    Dependency(dependency::DependencyCommand),

    /// Manage templates
    Template(template::TemplateCommand),

    /// Manage the cache
    Cache(cache::CacheCommand),
}

impl Cli {
    /// Runs the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Global options from the parsed flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.configfile.clone(),
            cache: self.cache.clone(),
            install_dir: self.install_dir.clone(),
            trust_cache: self.trust_cache,
        }
    }

    /// Runs the parsed command with explicit global options.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let ctx = CommandContext::load(config)?;
        let known: Vec<String> = ctx.config.dependencies.keys().cloned().collect();

        let result = match self.command {
            Commands::Install(cmd) => cmd.execute(ctx).await,
            Commands::Download(cmd) => cmd.execute(ctx).await,
            Commands::Extract(cmd) => cmd.execute(ctx).await,
            Commands::Checksums(cmd) => cmd.execute(ctx).await,
            Commands::Validate(cmd) => cmd.execute(ctx).await,
            Commands::Dependency(cmd) => cmd.execute(&ctx),
            Commands::Template(cmd) => cmd.execute(ctx).await,
            Commands::Cache(cmd) => cmd.execute(&ctx),
        };
        result.map_err(|e| suggest_dependency(e, &known))
    }
}

/// Adds a "did you mean" suggestion to unknown-dependency errors.
fn suggest_dependency(error: anyhow::Error, known: &[String]) -> anyhow::Error {
    let unknown = error.chain().find_map(|e| match e.downcast_ref::<BindepError>() {
        Some(BindepError::UnknownDependency {
            name,
        }) => Some(name.clone()),
        _ => None,
    });
    match unknown {
        Some(name) => with_similar_names(user_friendly_error(error), &name, known).into(),
        None => error,
    }
}

/// Runs blocking work that may use the blocking HTTP client off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| anyhow::anyhow!("Task failed: {e}"))?
}
