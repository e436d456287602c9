use super::{connect, require, GlobalArgs, OutputFormat};
use crate::api::LogQuery;
use crate::normalize::format_timestamp;
use crate::reconcile::{fetch_logs, LogSession};
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Site host, defaults to logs.default_host
    #[arg(long)]
    pub host: Option<String>,

    /// Day to query (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<String>,

    /// Maximum records, defaults to logs.limit
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print the full record at this 1-based position instead of the table
    #[arg(long)]
    pub detail: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub async fn run(global: &GlobalArgs, args: LogsArgs) -> Result<()> {
    let config = global.load_config()?;
    let client = connect(&config).await?;

    let query = LogQuery {
        host: args.host.unwrap_or_else(|| config.logs.default_host.clone()),
        date: args
            .date
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
        limit: args.limit.unwrap_or(config.logs.limit),
    };

    let records = require(fetch_logs(&client, &query).await?)?;
    let mut session = LogSession::new();
    session.replace(query, records);

    if let Some(position) = args.detail {
        match position.checked_sub(1).and_then(|i| session.detail(i)) {
            Some(detail) => println!("{}", detail),
            None => bail!(
                "No record #{} ({} records returned)",
                position,
                session.records().len()
            ),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let raw: Vec<&serde_json::Value> = session.records().iter().map(|r| &r.raw).collect();
            println!("{}", serde_json::to_string_pretty(&raw)?);
        }
        OutputFormat::Text => {
            for (i, record) in session.records().iter().enumerate() {
                println!(
                    "{:>4}  {:19}  {:15}  {:12}  {:6}  {}",
                    i + 1,
                    format_timestamp(&record.request_time),
                    record.ip,
                    record.attack_type,
                    record.http_method,
                    record.request_uri
                );
            }
            println!("\n{} records", session.records().len());
        }
    }

    Ok(())
}
