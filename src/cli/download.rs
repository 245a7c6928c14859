//! Run the first stages of the pipeline and print where the result landed in the cache.

use anyhow::Result;
use clap::Args;

use super::blocking;
use super::common::{CommandContext, FetchArgs, system_or_current};
use crate::core::System;
use crate::fetch::HttpFetcher;
use crate::utils::Spinner;

/// Command to download a dependency into the cache.
#[derive(Args, Debug)]
pub struct DownloadCommand {
    /// Dependency to download
    pub dependency: String,

    /// Download for this system instead of the current one (`os/arch`)
    #[arg(short, long)]
    pub system: Option<System>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl DownloadCommand {
    /// Execute the download command.
    pub async fn execute(self, ctx: CommandContext) -> Result<()> {
        let system = system_or_current(self.system);
        let options = self.fetch.options(&ctx.cli);
        let spinner =
            Spinner::new(format!("Downloading {} for {system}", self.dependency), ctx.cli.progress());

        let config = ctx.config;
        let name = self.dependency;
        let path = blocking(move || {
            config.download_dependency(&name, &system, &options, &HttpFetcher::new())
        })
        .await;
        spinner.finish_and_clear();

        println!("{}", path?.display());
        Ok(())
    }
}

/// Command to download and extract a dependency.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Dependency to extract
    pub dependency: String,

    /// Extract for this system instead of the current one (`os/arch`)
    #[arg(short, long)]
    pub system: Option<System>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl ExtractCommand {
    /// Execute the extract command.
    pub async fn execute(self, ctx: CommandContext) -> Result<()> {
        let system = system_or_current(self.system);
        let options = self.fetch.options(&ctx.cli);
        let spinner =
            Spinner::new(format!("Extracting {} for {system}", self.dependency), ctx.cli.progress());

        let config = ctx.config;
        let name = self.dependency;
        let path = blocking(move || {
            config.extract_dependency(&name, &system, &options, &HttpFetcher::new())
        })
        .await;
        spinner.finish_and_clear();

        println!("{}", path?.display());
        Ok(())
    }
}
