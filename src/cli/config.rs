use super::GlobalArgs;
use crate::config::parser::save_config;
use crate::config::ConsoleConfig;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a config file
    Check {
        /// Config file, defaults to the global --config
        file: Option<PathBuf>,
    },

    /// Write a config file with default values
    Init {
        #[arg(short, long, default_value = "waf-console.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(global: &GlobalArgs, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Check { file } => {
            let Some(config) = file.or_else(|| global.config.clone()) else {
                bail!("No config file given, pass a path or --config");
            };
            println!("Checking configuration: {}", config.display());

            let cfg = ConsoleConfig::from_file(&config)?;
            let warnings = cfg.validate()?;

            if warnings.is_empty() {
                println!(" Configuration is valid!");
                return Ok(());
            }

            println!("Configuration loaded with warnings:\n");
            for warning in &warnings {
                println!("{}", warning);
            }
            if warnings.iter().any(|w| w.starts_with("[X]")) {
                bail!("Configuration has errors");
            }
            Ok(())
        }

        ConfigCommand::Init { output, force } => {
            if output.exists() && !force {
                bail!("{} already exists, use --force to overwrite", output.display());
            }
            save_config(&ConsoleConfig::default(), &output)?;
            println!(" Wrote default configuration to {}", output.display());
            Ok(())
        }
    }
}
