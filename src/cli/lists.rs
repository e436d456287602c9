use super::{connect, require, GlobalArgs};
use crate::reconcile::{load_text_lists, save_text, TextListName};
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ListsArgs {
    #[command(subcommand)]
    pub command: ListsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ListsCommand {
    /// Print the IP blacklist, IP whitelist and host whitelist
    Get,

    /// Replace one list (blackIp|whiteIp|whitehost) with a file's contents
    Put {
        name: TextListName,

        /// Source file, `-` for stdin
        input: PathBuf,
    },
}

pub async fn run(global: &GlobalArgs, args: ListsArgs) -> Result<()> {
    let config = global.load_config()?;
    let client = connect(&config).await?;

    match args.command {
        ListsCommand::Get => {
            let lists = require(load_text_lists(&client).await?)?;
            for name in TextListName::LISTS {
                println!("# {} ({})", name.title(), name);
                let text = lists.get(name).unwrap_or_default();
                print!("{}", text);
                if !text.is_empty() && !text.ends_with('\n') {
                    println!();
                }
                println!();
            }
        }
        ListsCommand::Put { name, input } => {
            if name == TextListName::WafConf {
                bail!("Use `file put waf.conf` to replace the configuration file");
            }
            let text = read_input(&input)?;
            require(save_text(&client, name, &text).await?)?;
            println!("[OK] {} saved", name.title());
        }
    }

    Ok(())
}

pub fn read_input(input: &PathBuf) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))
    }
}
