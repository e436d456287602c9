use super::{connect, require, GlobalArgs, OutputFormat};
use crate::reconcile::{load_rules, reload_config, rule_content, set_enabled, ToggleOutcome};
use anyhow::{bail, Result};
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List detection rules
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print a rule file's source
    Show { file: String },

    /// Enable a rule (takes effect after reload)
    Enable { file: String },

    /// Disable a rule (takes effect after reload)
    Disable { file: String },

    /// Reload the WAF configuration
    Reload,
}

pub async fn run(global: &GlobalArgs, args: RulesArgs) -> Result<()> {
    let config = global.load_config()?;
    let client = connect(&config).await?;

    match args.command {
        RulesCommand::List { format } => {
            let rules = require(load_rules(&client).await?)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rules)?),
                OutputFormat::Text => {
                    println!("{:<5} {:<22} {:<22} {:<7} {}", "STATE", "NAME", "FILE", "LEVEL", "DESCRIPTION");
                    for rule in &rules {
                        println!(
                            "{:<5} {:<22} {:<22} {:<7} {}",
                            if rule.enabled { "on" } else { "off" },
                            rule.name,
                            rule.file,
                            rule.level.as_str(),
                            rule.description
                        );
                    }
                    println!("\n{} rules", rules.len());
                }
            }
        }

        RulesCommand::Show { file } => {
            let content = require(rule_content(&client, &file).await?)?;
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }

        RulesCommand::Enable { file } => toggle(&client, &file, true).await?,
        RulesCommand::Disable { file } => toggle(&client, &file, false).await?,

        RulesCommand::Reload => {
            let outcome = require(reload_config(&client).await)?;
            if let Err(e) = outcome.result {
                bail!("Reload failed: {}", e);
            }
            match outcome.rules {
                Ok(rules) => {
                    let enabled = rules.iter().filter(|r| r.enabled).count();
                    println!("[OK] Configuration reloaded ({}/{} rules enabled)", enabled, rules.len());
                }
                Err(e) => println!("[OK] Configuration reloaded ({})", e),
            }
        }
    }

    Ok(())
}

async fn toggle(client: &crate::api::ApiClient, file: &str, enabled: bool) -> Result<()> {
    match set_enabled(client, file, enabled).await {
        ToggleOutcome::Confirmed { message, .. } => {
            println!("[OK] {}", message);
            Ok(())
        }
        ToggleOutcome::RolledBack {
            error,
            authoritative,
            ..
        } => {
            if let Ok(rules) = authoritative {
                if let Some(rule) = rules.iter().find(|r| r.file == file) {
                    eprintln!("{} is currently {}", file, if rule.enabled { "enabled" } else { "disabled" });
                }
            }
            bail!("Failed to update {}: {}", file, error)
        }
        ToggleOutcome::SessionExpired => require(None),
    }
}
