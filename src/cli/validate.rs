//! Validate dependencies and maintain their checksums.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;

use super::blocking;
use super::common::CommandContext;
use crate::core::System;
use crate::fetch::HttpFetcher;
use crate::utils::Spinner;

/// Command to check that dependencies download, verify and install.
///
/// Everything runs against a scratch cache, so the real cache and install directory are left
/// untouched.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Dependencies to validate (default: all)
    pub dependencies: Vec<String>,

    /// Systems to validate (default: each dependency's systems)
    #[arg(short, long = "system")]
    pub systems: Vec<System>,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub async fn execute(self, ctx: CommandContext) -> Result<()> {
        let spinner = Spinner::new("Validating dependencies", ctx.cli.progress());
        let config = ctx.config;
        let report = blocking(move || {
            config.validate(&self.dependencies, &self.systems, &HttpFetcher::new())
        })
        .await;
        spinner.finish_and_clear();
        let report = report?;

        if report.is_ok() {
            println!("{} {} dependency/system pairs valid", "✓".green(), report.checked);
            return Ok(());
        }

        for failure in &report.failures {
            println!(
                "{} {} ({}): {:#}",
                "✗".red(),
                failure.dependency.bold(),
                failure.system,
                failure.error
            );
        }
        bail!("{} of {} dependency/system pairs failed validation", report.failures.len(), report.checked)
    }
}

/// Manage recorded URL checksums.
#[derive(Args, Debug)]
pub struct ChecksumsCommand {
    #[command(subcommand)]
    command: ChecksumsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ChecksumsSubcommand {
    /// Download URLs without a recorded checksum and record it
    Add {
        /// Dependencies to add checksums for (default: all)
        dependencies: Vec<String>,

        /// Systems to add checksums for (default: each dependency's systems)
        #[arg(short, long = "system")]
        systems: Vec<System>,
    },

    /// Remove checksums no dependency resolves to
    Prune,
}

impl ChecksumsCommand {
    /// Execute the checksums command.
    pub async fn execute(self, mut ctx: CommandContext) -> Result<()> {
        match self.command {
            ChecksumsSubcommand::Add {
                dependencies,
                systems,
            } => {
                let spinner = Spinner::new("Downloading for checksums", ctx.cli.progress());
                let mut config = ctx.config;
                let result = blocking(move || {
                    let added = config.add_checksums(&dependencies, &systems, &HttpFetcher::new())?;
                    Ok((config, added))
                })
                .await;
                spinner.finish_and_clear();
                let (config, added) = result?;

                ctx.config = config;
                if !added.is_empty() {
                    ctx.save()?;
                }
                for url in &added {
                    println!("{} {url}", "+".green());
                }
                println!("Added {} checksums", added.len());
            }
            ChecksumsSubcommand::Prune => {
                let removed = ctx.config.prune_checksums()?;
                if !removed.is_empty() {
                    ctx.save()?;
                }
                for url in &removed {
                    println!("{} {url}", "-".red());
                }
                println!("Pruned {} checksums", removed.len());
            }
        }
        Ok(())
    }
}
