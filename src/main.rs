// Obesity level predictor - main.rs
// Loads configuration, sets up logging and hands over to the CLI dispatcher.

use clap::Parser;
use obesity_predictor::cli::{dispatch, Cli};
use obesity_predictor::config_loader::load_config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    dispatch(cli.command, config).await
}
