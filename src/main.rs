//! Backtesting CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use quant_config::load_config;
use quant_monitor::{setup_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    // Flags win over the configuration file
    let log_level = cli
        .log_level
        .map(|level| level.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let log_format = if cli.json_logs || config.logging.is_json() {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    setup_logging(&log_level, log_format);

    match cli.command {
        Commands::Backtest(args) => cli::commands::backtest::run(args, &config).await,
        Commands::Compare(args) => cli::commands::compare::run(args, &config).await,
        Commands::Strategies => cli::commands::strategies::run(),
        Commands::ValidateConfig => cli::commands::validate::run(cli.config.as_deref(), &config),
    }
}
