use super::{connect, require, GlobalArgs};
use crate::api::IpListKind;
use crate::reconcile::{add_ip, load_membership, remove_ip, MembershipLists, MembershipOutcome};
use anyhow::{bail, Result};
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct IpArgs {
    #[command(subcommand)]
    pub command: IpCommand,
}

#[derive(Subcommand, Debug)]
pub enum IpCommand {
    /// Show whitelist and blacklist members
    List {
        /// Only this list (white|black)
        list: Option<IpListKind>,
    },

    /// Add an IP or CIDR to a list
    Add { list: IpListKind, ip: String },

    /// Remove an IP or CIDR from a list
    Remove { list: IpListKind, ip: String },
}

pub async fn run(global: &GlobalArgs, args: IpArgs) -> Result<()> {
    let config = global.load_config()?;
    let client = connect(&config).await?;

    match args.command {
        IpCommand::List { list } => {
            let lists = require(load_membership(&client).await?)?;
            match list {
                Some(kind) => print_list(&lists, kind),
                None => {
                    print_list(&lists, IpListKind::White);
                    println!();
                    print_list(&lists, IpListKind::Black);
                }
            }
        }
        IpCommand::Add { list, ip } => report(require(add_ip(&client, list, &ip).await?)?)?,
        IpCommand::Remove { list, ip } => report(require(remove_ip(&client, list, &ip).await?)?)?,
    }

    Ok(())
}

fn print_list(lists: &MembershipLists, kind: IpListKind) {
    let entries = lists.get(kind);
    println!("{} ({}):", kind, entries.len());
    for ip in entries {
        println!("  {}", ip);
    }
}

fn report(outcome: MembershipOutcome) -> Result<()> {
    if let Ok(ref lists) = outcome.reloaded {
        print_list(lists, outcome.kind);
    }
    match outcome.result {
        Ok(()) => {
            println!("[OK] {}", outcome.message());
            Ok(())
        }
        Err(_) => bail!(outcome.message()),
    }
}
