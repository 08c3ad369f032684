//! Toolweave CLI application
//!
//! Reads a batch of raw model responses, parses them into actions and
//! executes the tool calls with the built-in tools.
//!
//! ```bash
//! toolweave run --config toolweave.toml --input responses.json
//! ```

mod args;
mod router;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use toolweave_core::{LoggingConfig, ManagerConfig, load_config};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: Option<ManagerConfig> = cli
        .command
        .config_file()
        .map(|path| {
            load_config(path).with_context(|| format!("Failed to load '{}'", path.display()))
        })
        .transpose()?;

    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_logging(&logging, cli.verbose);

    router::route(cli.command, config).await
}
