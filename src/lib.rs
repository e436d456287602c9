pub mod api;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod reconcile;
pub mod tui;

pub use api::{ApiClient, WafApi};
pub use config::ConsoleConfig;
pub use error::{ConsoleError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
