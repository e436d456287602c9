use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
///
/// While the TUI owns the terminal, output always goes to the configured file.
pub fn init_logging(config: &LoggingConfig, tui: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let output = if tui { "file" } else { config.output.as_str() };
    let (writer, ansi) = match output {
        "file" => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file)
                .with_context(|| format!("Failed to open log file: {}", config.file.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        "stdout" => (BoxMakeWriter::new(std::io::stdout), true),
        _ => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);

    let installed = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .try_init(),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.pretty())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init(),
    };

    installed.context("Failed to install tracing subscriber")
}
