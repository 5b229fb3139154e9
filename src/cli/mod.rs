//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quant")]
#[command(author, version, about = "Rule-based strategy backtesting engine")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "QUANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (defaults to the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Backtest one strategy over historical bars
    Backtest(BacktestArgs),
    /// Backtest several strategy configurations over the same bars
    Compare(CompareArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

/// Where bars come from and which part of them to use.
#[derive(clap::Args)]
pub struct DataArgs {
    /// CSV file, or directory of <SYMBOL>.csv files
    #[arg(short, long)]
    pub data: PathBuf,

    /// Instrument symbol
    #[arg(short = 'S', long, default_value = "DATA")]
    pub symbol: String,

    /// First bar to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last bar to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

/// Overrides for the configured backtest settings.
#[derive(clap::Args)]
pub struct EngineArgs {
    /// Initial capital
    #[arg(long)]
    pub capital: Option<f64>,

    /// Commission rate as a fraction of notional
    #[arg(long)]
    pub commission: Option<f64>,

    /// Slippage rate as a fraction of price
    #[arg(long)]
    pub slippage: Option<f64>,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Strategy to backtest
    #[arg(short, long)]
    pub strategy: String,

    /// Strategy parameters as a JSON object
    #[arg(short, long, conflicts_with = "params_file")]
    pub params: Option<String>,

    /// File holding strategy parameters as a JSON object
    #[arg(long)]
    pub params_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Store the result as JSON in this directory
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Write the equity curve as CSV
    #[arg(long)]
    pub equity_csv: Option<PathBuf>,

    /// Write the trade ledger as CSV
    #[arg(long)]
    pub trades_csv: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// JSON file with a list of {"label", "kind", "params"} entries;
    /// every strategy with default parameters when omitted
    #[arg(short, long)]
    pub entries: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_backtest() {
        let cli = Cli::try_parse_from([
            "quant",
            "backtest",
            "--data",
            "prices.csv",
            "--strategy",
            "momentum",
            "--params",
            r#"{"fast_period": 5}"#,
            "--commission",
            "0.002",
        ])
        .unwrap();

        match cli.command {
            Commands::Backtest(args) => {
                assert_eq!(args.strategy, "momentum");
                assert_eq!(args.data.symbol, "DATA");
                assert_eq!(args.engine.commission, Some(0.002));
                assert!(args.params.is_some());
            }
            _ => panic!("expected backtest command"),
        }
    }

    #[test]
    fn test_params_and_params_file_conflict() {
        let result = Cli::try_parse_from([
            "quant",
            "backtest",
            "--data",
            "prices.csv",
            "--strategy",
            "momentum",
            "--params",
            "{}",
            "--params-file",
            "params.json",
        ]);
        assert!(result.is_err());
    }
}
