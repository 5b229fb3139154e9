//! CLI command implementations.

pub mod backtest;
pub mod compare;
pub mod strategies;
pub mod validate;

use anyhow::{Context, Result};
use quant_backtest::BacktestConfig;
use quant_config::AppConfig;
use quant_core::types::BarSeries;
use quant_data::{parse_timestamp, CsvDataSource};
use rust_decimal::Decimal;
use tracing::info;

use crate::cli::{DataArgs, EngineArgs};

/// Load the requested bars, restricted to the optional date range.
pub(crate) async fn load_series(args: &DataArgs) -> Result<BarSeries> {
    let source = CsvDataSource::new(&args.data).with_context(|| {
        format!(
            "Data path '{}' does not exist. Provide a CSV file or a directory of <SYMBOL>.csv files",
            args.data.display()
        )
    })?;
    let series = source
        .load_all(&args.symbol)
        .await
        .with_context(|| format!("Failed to load bars for {}", args.symbol))?;

    if args.start.is_none() && args.end.is_none() {
        return Ok(series);
    }

    let bound = |value: &Option<String>, open: i64| -> Result<i64> {
        match value {
            Some(raw) => parse_timestamp(raw).with_context(|| format!("Invalid date: {raw}")),
            None => Ok(open),
        }
    };
    let start = bound(&args.start, i64::MIN)?;
    let end = bound(&args.end, i64::MAX)?;

    let sliced = series
        .slice_range(start, end)
        .context("No bars in the requested date range")?;
    info!(kept = sliced.len(), total = series.len(), "applied date range");
    Ok(sliced)
}

/// Configured backtest settings with command-line overrides applied.
pub(crate) fn engine_config(config: &AppConfig, args: &EngineArgs) -> Result<BacktestConfig> {
    let mut engine = config.backtest.to_backtest_config();

    let decimal = |value: f64, name: &str| {
        Decimal::try_from(value).with_context(|| format!("Invalid {name}: {value}"))
    };
    if let Some(capital) = args.capital {
        engine.initial_capital = decimal(capital, "capital")?;
    }
    if let Some(commission) = args.commission {
        engine.commission_rate = decimal(commission, "commission")?;
    }
    if let Some(slippage) = args.slippage {
        engine.slippage_rate = decimal(slippage, "slippage")?;
    }

    engine.validate()?;
    Ok(engine)
}
