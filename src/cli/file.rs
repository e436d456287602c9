use super::lists::read_input;
use super::{connect, require, GlobalArgs};
use crate::reconcile::{load_text, save_text, TextListName, RELOAD_REQUIRED_HINT};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FileArgs {
    #[command(subcommand)]
    pub command: FileCommand,
}

#[derive(Subcommand, Debug)]
pub enum FileCommand {
    /// Print a server file (waf.conf|blackIp|whiteIp|whitehost)
    Get {
        name: TextListName,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a server file verbatim
    Put {
        name: TextListName,

        /// Source file, `-` for stdin
        input: PathBuf,
    },
}

pub async fn run(global: &GlobalArgs, args: FileArgs) -> Result<()> {
    let config = global.load_config()?;
    let client = connect(&config).await?;

    match args.command {
        FileCommand::Get { name, output } => {
            let text = require(load_text(&client, name).await?)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("[OK] {} written to {}", name, path.display());
                }
                None => print!("{}", text),
            }
        }
        FileCommand::Put { name, input } => {
            let text = read_input(&input)?;
            require(save_text(&client, name, &text).await?)?;
            if name == TextListName::WafConf {
                println!("[OK] {} saved; {}", name, RELOAD_REQUIRED_HINT);
            } else {
                println!("[OK] {} saved", name);
            }
        }
    }

    Ok(())
}
