use super::{connect, require, GlobalArgs, OutputFormat};
use crate::normalize::{format_number, DistributionKind, StatsSnapshot};
use crate::reconcile::load_stats;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Entries shown per distribution in text output
    #[arg(long, default_value = "5")]
    pub top: usize,
}

pub async fn run(global: &GlobalArgs, args: StatsArgs) -> Result<()> {
    let config = global.load_config()?;
    let client = connect(&config).await?;
    let snapshot = require(load_stats(&client).await?)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Text => print!("{}", render_text(&snapshot, args.top)),
    }

    Ok(())
}

pub fn render_text(snapshot: &StatsSnapshot, top: usize) -> String {
    let mut out = String::new();
    out.push_str("=== WAF Statistics ===\n\n");
    out.push_str(&format!(
        "Requests:    {} total, {} blocked ({})\n",
        format_number(snapshot.total_requests),
        format_number(snapshot.blocked_requests),
        snapshot.block_rate()
    ));
    out.push_str(&format!("Blocked IPs: {}\n", format_number(snapshot.blocked_ips)));
    out.push_str(&format!("CC attacks:  {}\n", format_number(snapshot.cc_attacks)));

    for kind in DistributionKind::ALL {
        let dist = snapshot.distribution(kind);
        out.push_str(&format!("\n{}:\n", kind.title()));
        if dist.is_empty() {
            out.push_str("  (no data)\n");
            continue;
        }
        for (label, count) in dist.entries().iter().take(top) {
            out.push_str(&format!("  {:<24} {}\n", label, format_number(*count)));
        }
        if dist.len() > top {
            out.push_str(&format!("  ... and {} more\n", dist.len() - top));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_stats;
    use serde_json::json;

    #[test]
    fn test_text_report() {
        let snapshot = normalize_stats(&json!({
            "total_requests": 12500,
            "blocked_requests": 250,
            "attack_types": {"sqli": 200, "xss": 50},
        }));
        let text = render_text(&snapshot, 1);

        assert!(text.contains("12.5K total, 250 blocked (2.00%)"));
        assert!(text.contains("sqli"));
        assert!(text.contains("... and 1 more"));
        assert!(text.contains("(no data)"));
    }
}
