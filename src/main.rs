use anyhow::Result;
use clap::{Parser, Subcommand};
use waf_console::{cli, logging};

#[derive(Parser)]
#[command(name = "waf-console")]
#[command(version = waf_console::VERSION)]
#[command(about = "Operator console for the WAF admin API", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: cli::GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal console (default)
    Tui(cli::TuiArgs),

    /// Show traffic statistics
    Stats(cli::StatsArgs),

    /// List, inspect and toggle detection rules
    Rules(cli::RulesArgs),

    /// Manage whitelist/blacklist members
    Ip(cli::IpArgs),

    /// Read or replace the IP/host text lists
    Lists(cli::ListsArgs),

    /// Query attack logs
    Logs(cli::LogsArgs),

    /// Read or replace a server file
    File(cli::FileArgs),

    /// Configuration management
    Config(cli::ConfigArgs),

    /// Verify credentials against the admin API
    Login(cli::LoginArgs),

    /// End the server-side session
    Logout(cli::LogoutArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = cli.global;

    let command = cli.command.unwrap_or(Commands::Tui(cli::TuiArgs::default()));
    if !matches!(command, Commands::Tui(_)) {
        let logging_config = global
            .load_config()
            .map(|config| config.logging)
            .unwrap_or_default();
        logging::init_logging(&logging_config, false)?;
    }

    match command {
        Commands::Tui(args) => cli::tui::run(&global, args).await,
        Commands::Stats(args) => cli::stats::run(&global, args).await,
        Commands::Rules(args) => cli::rules::run(&global, args).await,
        Commands::Ip(args) => cli::ip::run(&global, args).await,
        Commands::Lists(args) => cli::lists::run(&global, args).await,
        Commands::Logs(args) => cli::logs::run(&global, args).await,
        Commands::File(args) => cli::file::run(&global, args).await,
        Commands::Config(args) => cli::config::run(&global, args).await,
        Commands::Login(args) => cli::session::login(&global, args).await,
        Commands::Logout(args) => cli::session::logout(&global, args).await,
    }
}
