//! List templates and copy them in from template sources.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::blocking;
use super::common::CommandContext;
use crate::fetch::HttpFetcher;

/// Manage templates.
#[derive(Args, Debug)]
pub struct TemplateCommand {
    #[command(subcommand)]
    command: TemplateSubcommand,
}

#[derive(Subcommand, Debug)]
enum TemplateSubcommand {
    /// List local templates and template sources
    List,

    /// Copy a template from a template source into the config
    Copy {
        /// Template source name
        source: String,

        /// Template to copy
        template: String,

        /// Local name for the copy (default: `source#template`)
        #[arg(long = "as")]
        dest: Option<String>,
    },
}

impl TemplateCommand {
    /// Execute the template command.
    pub async fn execute(self, mut ctx: CommandContext) -> Result<()> {
        match self.command {
            TemplateSubcommand::List => {
                for name in ctx.config.templates.keys() {
                    println!("{name}");
                }
                for (name, location) in &ctx.config.template_sources {
                    println!("{} {}", format!("{name}:").dimmed(), location.dimmed());
                }
            }
            TemplateSubcommand::Copy {
                source,
                template,
                dest,
            } => {
                let mut config = ctx.config;
                let (config, name) = blocking(move || {
                    let name = config.copy_template_from_source(
                        &source,
                        &template,
                        dest.as_deref(),
                        &HttpFetcher::new(),
                    )?;
                    Ok((config, name))
                })
                .await?;

                ctx.config = config;
                ctx.save()?;
                println!("{} {}", "✓".green(), name.bold());
            }
        }
        Ok(())
    }
}
