//! Inspect configured dependencies.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use super::common::CommandContext;
use crate::core::System;
use crate::models::BuiltDependency;

/// Inspect dependencies.
#[derive(Args, Debug)]
pub struct DependencyCommand {
    #[command(subcommand)]
    command: DependencySubcommand,
}

#[derive(Subcommand, Debug)]
enum DependencySubcommand {
    /// List dependency names
    List,

    /// Print dependencies as resolved for each system
    Info {
        /// Dependency to show
        dependency: String,

        /// Systems to resolve for (default: the dependency's systems)
        #[arg(short, long = "system")]
        systems: Vec<System>,
    },

    /// List the systems a dependency supports
    Systems {
        /// Dependency to show
        dependency: String,
    },
}

impl DependencyCommand {
    /// Execute the dependency command.
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let config = &ctx.config;
        match self.command {
            DependencySubcommand::List => {
                for name in config.dependencies.keys() {
                    println!("{name}");
                }
            }
            DependencySubcommand::Info {
                dependency,
                systems,
            } => {
                let built = config
                    .target_systems(&dependency, &systems)?
                    .iter()
                    .map(|system| config.build_dependency(&dependency, system))
                    .collect::<Result<Vec<BuiltDependency>>>()?;
                let yaml = serde_yaml::to_string(&built)
                    .context("Failed to serialize resolved dependency")?;
                print!("{yaml}");
            }
            DependencySubcommand::Systems {
                dependency,
            } => {
                let systems = config.dependency_systems(&dependency)?;
                if systems.is_empty() {
                    println!("{}", "any".dimmed());
                }
                for system in systems {
                    println!("{system}");
                }
            }
        }
        Ok(())
    }
}
