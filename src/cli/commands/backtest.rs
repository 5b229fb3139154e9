//! Backtest command implementation.

use anyhow::{Context, Result};
use quant_backtest::{BacktestEngine, JsonFileSink, ResultSink};
use quant_config::AppConfig;
use quant_monitor::RunTimer;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use super::{engine_config, load_series};
use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, config: &AppConfig) -> Result<()> {
    info!(strategy = %args.strategy, symbol = %args.data.symbol, "starting backtest");

    let params = strategy_params(&args).await?;
    let engine_config = engine_config(config, &args.engine)?;
    let series = load_series(&args.data).await?;

    let timer = RunTimer::start("backtest");
    let engine = BacktestEngine::new(engine_config);
    let result = engine
        .run(&args.strategy, &params, &series)
        .with_context(|| format!("Backtest of {} failed", args.strategy))?;
    timer.finish();

    match args.output {
        OutputFormat::Json => println!("{}", result.to_json()?),
        OutputFormat::Text => println!("{}", result.summary()),
    }

    let results_dir = args
        .results_dir
        .clone()
        .or_else(|| config.backtest.results_dir.as_ref().map(PathBuf::from));
    if let Some(dir) = results_dir {
        let mut sink = JsonFileSink::new(&dir)?;
        let id = sink.store(&result)?;
        info!(id = %id, dir = %dir.display(), "result saved");
    }

    if let Some(path) = &args.equity_csv {
        tokio::fs::write(path, result.equity_to_csv())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "equity curve exported");
    }
    if let Some(path) = &args.trades_csv {
        tokio::fs::write(path, result.trades_to_csv())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "trade ledger exported");
    }

    Ok(())
}

/// Strategy parameters from `--params` or `--params-file`; defaults otherwise.
async fn strategy_params(args: &BacktestArgs) -> Result<Value> {
    if let Some(raw) = &args.params {
        return serde_json::from_str(raw).context("--params is not valid JSON");
    }
    if let Some(path) = &args.params_file {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", path.display()));
    }
    Ok(Value::Null)
}
