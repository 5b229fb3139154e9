//! Backtesting engine.
//!
//! Runs a signal generator over a historical bar series, simulating a single
//! long-only position with commission and slippage, then derives the trade
//! ledger, equity curve and performance metrics.

mod comparison;
mod engine;
mod report;
mod sink;
mod statistics;

pub use comparison::{rank_by_return, run_comparison, ComparisonEntry, ComparisonOutcome};
pub use engine::{BacktestConfig, BacktestEngine, PRECOMPUTED_STRATEGY};
pub use report::{annualized_return_pct, BacktestResult, MIN_ANNUALIZATION_BARS};
pub use sink::{JsonFileSink, MemorySink, ResultSink};
pub use statistics::{
    bar_returns, calculate_metrics, max_drawdown_pct, sharpe_ratio, sortino_ratio,
    PerformanceMetrics, PERIODS_PER_YEAR,
};
