//! Compare command implementation.

use anyhow::{Context, Result};
use quant_backtest::{rank_by_return, run_comparison, ComparisonEntry, ComparisonOutcome};
use quant_config::AppConfig;
use quant_monitor::RunTimer;
use quant_strategies::StrategyKind;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

use super::{engine_config, load_series};
use crate::cli::{CompareArgs, OutputFormat};

pub async fn run(args: CompareArgs, config: &AppConfig) -> Result<()> {
    let entries = match &args.entries {
        Some(path) => read_entries(path).await?,
        None => default_entries(),
    };
    if entries.is_empty() {
        anyhow::bail!("No comparison entries given");
    }

    let engine_config = engine_config(config, &args.engine)?;
    let series = load_series(&args.data).await?;

    let timer = RunTimer::start("comparison");
    let outcomes = tokio::task::spawn_blocking(move || {
        run_comparison(&engine_config, &series, &entries)
    })
    .await
    .context("Comparison task failed")?;
    timer.finish();

    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!(succeeded, failed = outcomes.len() - succeeded, "comparison complete");

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&outcomes))?),
        OutputFormat::Text => print_table(&outcomes),
    }

    Ok(())
}

async fn read_entries(path: &Path) -> Result<Vec<ComparisonEntry>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid entries in {}", path.display()))
}

/// Every registered strategy with its default parameters.
fn default_entries() -> Vec<ComparisonEntry> {
    StrategyKind::ALL
        .iter()
        .map(|kind| ComparisonEntry {
            label: kind.as_str().to_string(),
            kind: kind.as_str().to_string(),
            params: Value::Null,
        })
        .collect()
}

fn to_json(outcomes: &[ComparisonOutcome]) -> Value {
    let rows: Vec<Value> = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(result) => json!({ "label": o.label, "kind": o.kind, "result": result }),
            Err(e) => json!({ "label": o.label, "kind": o.kind, "error": e.to_string() }),
        })
        .collect();
    Value::Array(rows)
}

fn print_table(outcomes: &[ComparisonOutcome]) {
    println!("Strategy Comparison");
    println!("═══════════════════════════════════════════════════════════════════════");
    println!(
        "  {:<20} {:>10} {:>10} {:>8} {:>8} {:>10}",
        "Label", "Return %", "Annual %", "Trades", "Sharpe", "Max DD %"
    );
    println!("  ─────────────────────────────────────────────────────────────────────");

    for outcome in rank_by_return(outcomes) {
        if let Ok(result) = &outcome.result {
            let (sharpe, drawdown) = result
                .metrics
                .as_ref()
                .map(|m| (format!("{:.2}", m.sharpe_ratio), format!("{:.2}", m.max_drawdown_pct)))
                .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
            let annualized = result
                .annualized_return_pct
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<20} {:>10.2} {:>10} {:>8} {:>8} {:>10}",
                outcome.label,
                result.total_return_pct,
                annualized,
                result.trades.len(),
                sharpe,
                drawdown
            );
        }
    }

    for outcome in outcomes {
        if let Err(e) = &outcome.result {
            println!("  {:<20} failed: {}", outcome.label, e);
        }
    }
}
