//! Backtest results and report generation.

use quant_core::types::{EquityPoint, Trade};
use quant_core::TradingError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::statistics::{PerformanceMetrics, PERIODS_PER_YEAR};
use crate::BacktestConfig;

/// Complete outcome of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Strategy identifier
    pub strategy: String,
    /// Instrument symbol
    pub symbol: String,
    /// Configuration used
    pub config: BacktestConfig,
    pub initial_capital: Decimal,
    pub final_capital: Decimal,
    /// Total return percentage
    pub total_return_pct: Decimal,
    /// Annualized return percentage (daily bars), `None` when the run is too
    /// short to annualize or the rate is not representable
    pub annualized_return_pct: Option<Decimal>,
    pub bars_processed: usize,
    /// Trade ledger, all closed
    pub trades: Vec<Trade>,
    /// One point per processed bar
    pub equity_curve: Vec<EquityPoint>,
    /// `None` when no trade was made
    pub metrics: Option<PerformanceMetrics>,
}

/// Fewest bars a return is annualized over; shorter runs extrapolate noise.
pub const MIN_ANNUALIZATION_BARS: usize = 20;

/// Compound a total return over `bars` daily bars into a yearly rate.
pub fn annualized_return_pct(total_return_pct: Decimal, bars: usize) -> Option<Decimal> {
    if bars < MIN_ANNUALIZATION_BARS {
        return None;
    }
    let growth = 1.0 + total_return_pct.to_f64()? / 100.0;
    if growth <= 0.0 {
        return Some(Decimal::from(-100));
    }
    let annualized = (growth.powf(PERIODS_PER_YEAR / bars as f64) - 1.0) * 100.0;
    if !annualized.is_finite() {
        return None;
    }
    Decimal::try_from(annualized).ok()
}

/// Two-decimal rendering, "-" when absent.
pub(crate) fn format_optional_pct(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "-".to_string())
}

impl BacktestResult {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Strategy:            {}\n", self.strategy));
        s.push_str(&format!("  Symbol:              {}\n\n", self.symbol));

        s.push_str("PERFORMANCE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Initial Capital:     ${:.2}\n", self.initial_capital));
        s.push_str(&format!("  Final Capital:       ${:.2}\n", self.final_capital));
        s.push_str(&format!("  Total Return:        {:.2}%\n", self.total_return_pct));
        s.push_str(&format!(
            "  Annualized Return:   {}\n",
            format_optional_pct(self.annualized_return_pct)
        ));
        s.push('\n');

        match &self.metrics {
            Some(m) => {
                s.push_str("RISK METRICS\n");
                s.push_str("───────────────────────────────────────────────────────────\n");
                s.push_str(&format!("  Max Drawdown:        {:.2}%\n", m.max_drawdown_pct));
                s.push_str(&format!("  Sharpe Ratio:        {:.2}\n", m.sharpe_ratio));
                s.push_str(&format!("  Sortino Ratio:       {:.2}\n", m.sortino_ratio));
                s.push_str(&format!("  Profit Factor:       {:.2}\n", m.profit_factor));
                s.push('\n');

                s.push_str("TRADE STATISTICS\n");
                s.push_str("───────────────────────────────────────────────────────────\n");
                s.push_str(&format!("  Total Trades:        {}\n", m.total_trades));
                s.push_str(&format!("  Winning Trades:      {}\n", m.profitable_trades));
                s.push_str(&format!("  Losing Trades:       {}\n", m.losing_trades));
                s.push_str(&format!("  Breakeven Trades:    {}\n", m.breakeven_trades));
                s.push_str(&format!("  Win Rate:            {:.2}%\n", m.win_rate_pct));
                s.push_str(&format!("  Avg Win:             ${:.2}\n", m.avg_profit));
                s.push_str(&format!("  Avg Loss:            ${:.2}\n", m.avg_loss));
            }
            None => {
                s.push_str("TRADE STATISTICS\n");
                s.push_str("───────────────────────────────────────────────────────────\n");
                s.push_str("  No trades were made; metrics are not available.\n");
            }
        }
        s.push('\n');

        s.push_str("EXECUTION\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Bars Processed:      {}\n", self.bars_processed));
        s.push_str(&format!("  Equity Points:       {}\n", self.equity_curve.len()));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, TradingError> {
        serde_json::to_string_pretty(self).map_err(|e| TradingError::Serialization(e.to_string()))
    }

    /// Export the equity curve as CSV.
    pub fn equity_to_csv(&self) -> String {
        let mut csv = String::from("timestamp,equity\n");
        for point in &self.equity_curve {
            csv.push_str(&format!("{},{}\n", point.timestamp, point.equity));
        }
        csv
    }

    /// Export the trade ledger as CSV.
    pub fn trades_to_csv(&self) -> String {
        fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }

        let mut csv = String::from(
            "entry_time,entry_price,quantity,side,commission,exit_time,exit_price,pnl,pnl_percent\n",
        );
        for t in &self.trades {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                t.entry_time,
                t.entry_price,
                t.quantity,
                t.side,
                t.commission,
                opt(&t.exit_time),
                opt(&t.exit_price),
                opt(&t.pnl),
                opt(&t.pnl_percent.map(|p| p.round_dp(4))),
            ));
        }
        csv
    }
}
