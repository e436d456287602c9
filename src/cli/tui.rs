use super::GlobalArgs;
use crate::api::{ApiClient, WafApi};
use crate::logging;
use crate::tui::{self, app::App};
use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Default)]
pub struct TuiArgs {
    /// Dashboard refresh interval in seconds, overrides dashboard.refresh_seconds
    #[arg(short, long)]
    pub refresh: Option<u64>,
}

pub async fn run(global: &GlobalArgs, args: TuiArgs) -> Result<()> {
    let mut config = global.load_config()?;
    if let Some(refresh) = args.refresh {
        config.dashboard.refresh_seconds = refresh;
    }
    logging::init_logging(&config.logging, true)?;

    let client = ApiClient::from_config(&config.api)?;
    info!(url = %client.base_url(), "Starting console");

    let session = client.session();
    let busy = client.busy();
    let base_url = client.base_url().to_string();
    let api: Arc<dyn WafApi> = Arc::new(client);

    let (app, results) = App::new(api, session, busy, base_url, &config);
    tui::run_tui(app, results).await
}
