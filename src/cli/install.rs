//! Install dependencies into the install directory.
//!
//! Every named dependency (or all of them) runs through download, extract and install on the
//! blocking pool, at most [`default_max_parallel`] at a time. Concurrent runs of the command,
//! even from other processes, share the cache safely.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::blocking;
use super::common::{CommandContext, FetchArgs, system_or_current};
use crate::config::InstallOptions;
use crate::constants::default_max_parallel;
use crate::core::System;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::utils::Spinner;

/// Command to install dependencies.
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Dependencies to install (default: all)
    pub dependencies: Vec<String>,

    /// Install for this system instead of the current one (`os/arch`)
    #[arg(short, long)]
    pub system: Option<System>,

    /// Install to this path instead of the install directory (single dependency only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the binary's path inside the cache instead of installing it
    #[arg(long, conflicts_with = "output")]
    pub to_cache: bool,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl InstallCommand {
    /// Execute the install command.
    pub async fn execute(self, ctx: CommandContext) -> Result<()> {
        let names = ctx.config.dependency_names(&self.dependencies);
        if names.is_empty() {
            println!("No dependencies to install");
            return Ok(());
        }
        if self.output.is_some() && names.len() != 1 {
            bail!("--output requires exactly one dependency");
        }

        let system = system_or_current(self.system);
        let options = InstallOptions {
            fetch: self.fetch.options(&ctx.cli),
            output: self.output,
            to_cache: self.to_cache,
        };
        let to_cache = options.to_cache;

        let spinner = Spinner::new(
            format!("Installing {} dependencies for {system}", names.len()),
            ctx.cli.progress(),
        );

        let config = Arc::new(ctx.config);
        let options = Arc::new(options);
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new());

        let results: Vec<(String, Result<PathBuf>)> = stream::iter(names)
            .map(|name| {
                let config = Arc::clone(&config);
                let options = Arc::clone(&options);
                let fetcher = Arc::clone(&fetcher);
                let system = system.clone();
                async move {
                    let task_name = name.clone();
                    let result = blocking(move || {
                        config.install_dependency(&task_name, &system, &options, fetcher.as_ref())
                    })
                    .await;
                    (name, result)
                }
            })
            .buffer_unordered(default_max_parallel())
            .collect()
            .await;
        spinner.finish_and_clear();

        let mut errors = Vec::new();
        for (name, result) in results {
            match result {
                Ok(path) if to_cache => println!("{}", path.display()),
                Ok(path) => {
                    debug!(dependency = %name, path = %path.display(), "Installed");
                    println!("{} {} -> {}", "✓".green(), name.bold(), path.display());
                }
                Err(error) => errors.push((name, error)),
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        if errors.len() == 1 {
            let (_, error) = errors.remove(0);
            return Err(error);
        }

        errors.sort_by(|a, b| a.0.cmp(&b.0));
        let details: Vec<String> =
            errors.iter().map(|(name, error)| format!("  {name}: {error:#}")).collect();
        bail!("Failed to install {} dependencies:\n{}", errors.len(), details.join("\n"))
    }
}
