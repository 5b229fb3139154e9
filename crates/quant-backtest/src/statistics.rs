//! Performance metrics over a finished backtest.

use quant_core::types::{EquityPoint, Trade};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading days per year, for annualising per-bar statistics.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Performance metrics for a run with at least one closed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total number of closed trades
    pub total_trades: usize,
    /// Trades with pnl > 0
    pub profitable_trades: usize,
    /// Trades with pnl < 0
    pub losing_trades: usize,
    /// Trades with pnl == 0
    pub breakeven_trades: usize,
    /// Win rate percentage
    pub win_rate_pct: Decimal,
    /// Average profit per winning trade
    pub avg_profit: Decimal,
    /// Average loss per losing trade (positive magnitude)
    pub avg_loss: Decimal,
    /// Profit factor (gross profit / gross loss), 0 without losses
    pub profit_factor: Decimal,
    /// Sharpe ratio (risk-free rate of 0)
    pub sharpe_ratio: f64,
    /// Sortino ratio
    pub sortino_ratio: f64,
    /// Maximum drawdown percentage, 0 or negative
    pub max_drawdown_pct: Decimal,
}

/// Calculate metrics from the trade ledger and equity curve.
///
/// Returns `None` when no trade was closed, so an idle run cannot be mistaken
/// for a breakeven one.
pub fn calculate_metrics(trades: &[Trade], equity_curve: &[EquityPoint]) -> Option<PerformanceMetrics> {
    let pnls: Vec<Decimal> = trades.iter().filter_map(|t| t.pnl).collect();
    if pnls.is_empty() {
        return None;
    }

    let mut profitable_trades = 0usize;
    let mut losing_trades = 0usize;
    let mut total_profit = Decimal::ZERO;
    let mut total_loss = Decimal::ZERO;

    for pnl in &pnls {
        if *pnl > Decimal::ZERO {
            profitable_trades += 1;
            total_profit = total_profit.saturating_add(*pnl);
        } else if *pnl < Decimal::ZERO {
            losing_trades += 1;
            total_loss = total_loss.saturating_add(pnl.abs());
        }
    }

    let total_trades = pnls.len();
    let win_rate_pct =
        Decimal::from(profitable_trades * 100) / Decimal::from(total_trades);

    let avg_profit = if profitable_trades > 0 {
        total_profit / Decimal::from(profitable_trades)
    } else {
        Decimal::ZERO
    };
    let avg_loss = if losing_trades > 0 {
        total_loss / Decimal::from(losing_trades)
    } else {
        Decimal::ZERO
    };
    let profit_factor = if total_loss > Decimal::ZERO {
        total_profit.checked_div(total_loss).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    };

    let returns = bar_returns(equity_curve);

    Some(PerformanceMetrics {
        total_trades,
        profitable_trades,
        losing_trades,
        breakeven_trades: total_trades - profitable_trades - losing_trades,
        win_rate_pct,
        avg_profit,
        avg_loss,
        profit_factor,
        sharpe_ratio: sharpe_ratio(&returns),
        sortino_ratio: sortino_ratio(&returns),
        max_drawdown_pct: max_drawdown_pct(equity_curve),
    })
}

/// Simple returns between consecutive equity points.
///
/// A point following a non-positive equity has no meaningful return and is
/// skipped.
pub fn bar_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0].equity > Decimal::ZERO)
        .filter_map(|w| {
            w[1].equity
                .checked_sub(w[0].equity)
                .and_then(|change| change.checked_div(w[0].equity))
                .and_then(|r| r.to_f64())
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; `None` with fewer than two values.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|r| (r - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Annualised Sharpe ratio, 0 when undefined.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    match sample_std(returns) {
        Some(std_dev) if std_dev > 0.0 => mean(returns) / std_dev * PERIODS_PER_YEAR.sqrt(),
        _ => 0.0,
    }
}

/// Annualised Sortino ratio: mean of all returns over the deviation of the
/// negative ones, 0 when undefined.
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    let negative: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    match sample_std(&negative) {
        Some(downside) if downside > 0.0 => mean(returns) / downside * PERIODS_PER_YEAR.sqrt(),
        _ => 0.0,
    }
}

/// Largest peak-to-trough decline as a non-positive percentage.
pub fn max_drawdown_pct(equity_curve: &[EquityPoint]) -> Decimal {
    let mut peak: Option<Decimal> = None;
    let mut worst = Decimal::ZERO;

    for point in equity_curve {
        let p = match peak {
            Some(p) if p >= point.equity => p,
            _ => {
                peak = Some(point.equity);
                point.equity
            }
        };
        if p > Decimal::ZERO {
            // a fall below -MAX is already far past a total loss
            let drawdown = point
                .equity
                .checked_sub(p)
                .and_then(|fall| fall.checked_div(p))
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::MIN);
            worst = worst.min(drawdown);
        }
    }

    worst
}
