//! bindep CLI entry point
//!
//! Parses arguments, runs the command and turns errors into a friendly message and exit
//! code 1.

use anyhow::Result;
use bindep::cli;
use bindep::core::error::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
