//! Cache maintenance.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::common::CommandContext;

/// Manage the cache.
#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
enum CacheSubcommand {
    /// Remove all downloads and extracted archives
    ///
    /// Waits for other bindep processes using the cache to finish first.
    Clear,
}

impl CacheCommand {
    /// Execute the cache command.
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.command {
            CacheSubcommand::Clear => {
                ctx.config.clear_cache()?;
                println!("{} Cleared {}", "✓".green(), ctx.config.cache_dir()?.display());
            }
        }
        Ok(())
    }
}
