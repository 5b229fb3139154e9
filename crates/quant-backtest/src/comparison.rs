//! Side-by-side evaluation of several strategies on one series.

use quant_core::types::BarSeries;
use quant_core::TradingError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{BacktestConfig, BacktestEngine, BacktestResult};

/// One strategy to evaluate in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Display label, unique within a comparison
    pub label: String,
    /// Strategy identifier
    pub kind: String,
    /// Strategy parameters (defaults when omitted)
    #[serde(default)]
    pub params: Value,
}

/// Outcome of one comparison entry.
#[derive(Debug)]
pub struct ComparisonOutcome {
    pub label: String,
    pub kind: String,
    pub result: Result<BacktestResult, TradingError>,
}

impl ComparisonOutcome {
    /// Total return when the run succeeded.
    pub fn total_return_pct(&self) -> Option<rust_decimal::Decimal> {
        self.result.as_ref().ok().map(|r| r.total_return_pct)
    }
}

/// Run every entry against `series` in parallel.
///
/// Each entry gets its own engine. The output preserves input order and a
/// failing entry does not affect the others.
pub fn run_comparison(
    config: &BacktestConfig,
    series: &BarSeries,
    entries: &[ComparisonEntry],
) -> Vec<ComparisonOutcome> {
    info!(
        entries = entries.len(),
        symbol = %series.symbol,
        "running strategy comparison"
    );

    entries
        .par_iter()
        .map(|entry| {
            let engine = BacktestEngine::new(config.clone());
            let result = engine.run(&entry.kind, &entry.params, series);
            if let Err(e) = &result {
                warn!(label = %entry.label, error = %e, "comparison entry failed");
            }
            ComparisonOutcome {
                label: entry.label.clone(),
                kind: entry.kind.clone(),
                result,
            }
        })
        .collect()
}

/// Successful outcomes ordered by total return, best first.
pub fn rank_by_return(outcomes: &[ComparisonOutcome]) -> Vec<&ComparisonOutcome> {
    let mut ranked: Vec<&ComparisonOutcome> =
        outcomes.iter().filter(|o| o.result.is_ok()).collect();
    ranked.sort_by(|a, b| b.total_return_pct().cmp(&a.total_return_pct()));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::types::Bar;
    use serde_json::json;

    fn test_series() -> BarSeries {
        let bars = (0..80)
            .map(|i| {
                let price = 100.0 + (i as f64 * 0.2).sin() * 10.0 + i as f64 * 0.1;
                Bar::new(i * 86_400_000, price, price + 1.5, price - 1.5, price, 1000.0 + i as f64)
            })
            .collect();
        BarSeries::new("TEST", bars).unwrap()
    }

    fn entry(label: &str, kind: &str, params: Value) -> ComparisonEntry {
        ComparisonEntry {
            label: label.into(),
            kind: kind.into(),
            params,
        }
    }

    #[test]
    fn test_comparison_preserves_order_and_failures() {
        let entries = vec![
            entry("fast", "momentum", json!({ "fast_period": 3, "slow_period": 10 })),
            entry("bogus", "pairs", json!({})),
            entry("bands", "mean_reversion", json!({ "period": 10 })),
            entry("channel", "breakout", Value::Null),
        ];

        let outcomes = run_comparison(&BacktestConfig::default(), &test_series(), &entries);

        let labels: Vec<_> = outcomes.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["fast", "bogus", "bands", "channel"]);
        assert!(outcomes[1].result.is_err());
        assert!(outcomes.iter().filter(|o| o.result.is_ok()).count() == 3);
    }

    #[test]
    fn test_comparison_matches_single_runs() {
        let config = BacktestConfig::default();
        let series = test_series();
        let params = json!({ "fast_period": 5, "slow_period": 20, "ma_type": "ema" });

        let outcomes = run_comparison(&config, &series, &[entry("ema", "momentum", params.clone())]);
        let direct = BacktestEngine::new(config).run("momentum", &params, &series).unwrap();

        assert_eq!(outcomes[0].result.as_ref().unwrap(), &direct);
    }

    #[test]
    fn test_ranking() {
        let entries = vec![
            entry("a", "momentum", json!({ "fast_period": 3, "slow_period": 10 })),
            entry("b", "momentum", json!({ "fast_period": 5, "slow_period": 30 })),
            entry("bad", "momentum", json!({ "fast_period": 30, "slow_period": 5 })),
        ];
        let outcomes = run_comparison(&BacktestConfig::default(), &test_series(), &entries);
        let ranked = rank_by_return(&outcomes);

        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].total_return_pct() >= ranked[1].total_return_pct());
    }
}
