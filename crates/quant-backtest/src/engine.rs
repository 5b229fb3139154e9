//! Backtesting engine.

use quant_core::traits::SignalGenerator;
use quant_core::types::{BarSeries, EquityPoint, Signal, SignalFrame, Trade};
use quant_core::{DataError, TradingError};
use quant_risk::{PositionSizer, SizingMethod};
use quant_strategies::{StrategyKind, StrategyRegistry};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::report::{annualized_return_pct, BacktestResult};
use crate::statistics::calculate_metrics;

/// Strategy label used when simulating a precomputed signal frame.
pub const PRECOMPUTED_STRATEGY: &str = "precomputed";

/// Backtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Initial capital
    pub initial_capital: Decimal,
    /// Commission as a fraction of traded value
    pub commission_rate: Decimal,
    /// Slippage as a fraction of the close price
    pub slippage_rate: Decimal,
    /// Position sizing policy
    #[serde(default)]
    pub sizing: SizingMethod,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100000),
            commission_rate: dec!(0.001),
            slippage_rate: dec!(0.0005),
            sizing: SizingMethod::default(),
        }
    }
}

impl BacktestConfig {
    /// Check capital, cost rates and sizing.
    pub fn validate(&self) -> Result<(), TradingError> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(TradingError::Config(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        for (name, rate) in [
            ("commission_rate", self.commission_rate),
            ("slippage_rate", self.slippage_rate),
        ] {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(TradingError::Config(format!(
                    "{name} must be in [0, 1), got {rate}"
                )));
            }
        }
        self.sizing.validate().map_err(TradingError::Config)
    }
}

/// The position held while the engine is Long.
#[derive(Debug, Clone)]
struct OpenPosition {
    quantity: u64,
    entry_price: Decimal,
    entry_time: i64,
    entry_commission: Decimal,
    trade_index: usize,
}

impl OpenPosition {
    fn unrealized_pnl(&self, close: Decimal) -> Option<Decimal> {
        close
            .checked_sub(self.entry_price)?
            .checked_mul(Decimal::from(self.quantity))
    }
}

/// Error for a bar whose prices push ledger arithmetic out of the decimal range.
fn overflow(index: usize, what: &str) -> TradingError {
    DataError::InvalidBar {
        index,
        reason: format!("{what} overflows the decimal range"),
    }
    .into()
}

/// Backtesting engine.
///
/// Holds only configuration; every run owns its own ledger and equity curve,
/// so one engine can be reused and shared across threads.
pub struct BacktestEngine {
    config: BacktestConfig,
    sizer: PositionSizer,
    registry: StrategyRegistry,
}

impl BacktestEngine {
    /// Create a new backtest engine.
    pub fn new(config: BacktestConfig) -> Self {
        let sizer = PositionSizer::new(config.sizing);
        Self {
            config,
            sizer,
            registry: StrategyRegistry::new(),
        }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run a registered strategy over `series`.
    ///
    /// The strategy kind is resolved before anything else, so an unknown kind
    /// fails without touching parameters or data.
    pub fn run(
        &self,
        strategy_kind: &str,
        params: &Value,
        series: &BarSeries,
    ) -> Result<BacktestResult, TradingError> {
        let kind: StrategyKind = strategy_kind.parse()?;
        self.config.validate()?;
        let generator = self.registry.create_kind(kind, params)?;
        self.run_generator(generator.as_ref(), series)
    }

    /// Run an already-built signal generator over `series`.
    pub fn run_generator(
        &self,
        generator: &dyn SignalGenerator,
        series: &BarSeries,
    ) -> Result<BacktestResult, TradingError> {
        self.config.validate()?;
        info!(
            strategy = generator.name(),
            symbol = %series.symbol,
            bars = series.len(),
            "starting backtest"
        );
        let frame = generator.generate_signals(series);
        self.simulate_as(generator.name(), series, &frame)
    }

    /// Simulate a precomputed signal frame over `series`.
    pub fn simulate(
        &self,
        series: &BarSeries,
        frame: &SignalFrame,
    ) -> Result<BacktestResult, TradingError> {
        self.config.validate()?;
        self.simulate_as(PRECOMPUTED_STRATEGY, series, frame)
    }

    fn simulate_as(
        &self,
        strategy: &str,
        series: &BarSeries,
        frame: &SignalFrame,
    ) -> Result<BacktestResult, TradingError> {
        if series.is_empty() {
            return Err(DataError::EmptySeries.into());
        }
        frame.check_alignment(series.len())?;

        let initial_capital = self.config.initial_capital;
        let last_index = series.len() - 1;

        let mut capital = initial_capital;
        let mut position: Option<OpenPosition> = None;
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(series.len());

        for (index, (bar, signal)) in series.iter().zip(&frame.signals).enumerate() {
            let close = Decimal::try_from(bar.close).map_err(|e| DataError::InvalidBar {
                index,
                reason: format!("close {} not representable: {e}", bar.close),
            })?;

            position = match (position.take(), *signal) {
                (None, Signal::EnterLong) => Some(self.open_position(
                    index,
                    bar.timestamp,
                    close,
                    &mut capital,
                    &mut trades,
                )?),
                (Some(open), Signal::ExitLong) => {
                    self.close_position(open, index, bar.timestamp, close, &mut capital, &mut trades)?;
                    None
                }
                (held, _) => held,
            };

            if index == last_index {
                if let Some(open) = position.take() {
                    debug!(timestamp = bar.timestamp, "force-closing position at series end");
                    self.close_position(open, index, bar.timestamp, close, &mut capital, &mut trades)?;
                }
            }

            let equity = match &position {
                Some(open) => open
                    .unrealized_pnl(close)
                    .and_then(|pnl| capital.checked_add(pnl))
                    .ok_or_else(|| overflow(index, "equity"))?,
                None => capital,
            };
            equity_curve.push(EquityPoint {
                timestamp: bar.timestamp,
                equity,
            });
        }

        let metrics = calculate_metrics(&trades, &equity_curve);
        let total_return_pct = capital
            .checked_sub(initial_capital)
            .and_then(|gain| gain.checked_div(initial_capital))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow(last_index, "total return"))?;
        let bars_processed = equity_curve.len();

        info!(
            strategy,
            symbol = %series.symbol,
            trades = trades.len(),
            final_capital = %capital,
            total_return_pct = %total_return_pct.round_dp(2),
            "backtest finished"
        );

        Ok(BacktestResult {
            strategy: strategy.to_string(),
            symbol: series.symbol.clone(),
            config: self.config.clone(),
            initial_capital,
            final_capital: capital,
            total_return_pct,
            annualized_return_pct: annualized_return_pct(total_return_pct, bars_processed),
            bars_processed,
            trades,
            equity_curve,
            metrics,
        })
    }

    fn open_position(
        &self,
        index: usize,
        timestamp: i64,
        close: Decimal,
        capital: &mut Decimal,
        trades: &mut Vec<Trade>,
    ) -> Result<OpenPosition, TradingError> {
        let quantity = self.sizer.calculate(*capital, close);
        let units = Decimal::from(quantity);
        let fill = close
            .checked_mul(Decimal::ONE + self.config.slippage_rate)
            .ok_or_else(|| overflow(index, "entry fill"))?;
        let cost = fill
            .checked_mul(units)
            .ok_or_else(|| overflow(index, "entry cost"))?;
        let commission = cost
            .checked_mul(self.config.commission_rate)
            .ok_or_else(|| overflow(index, "entry commission"))?;

        *capital = cost
            .checked_add(commission)
            .and_then(|debit| capital.checked_sub(debit))
            .ok_or_else(|| overflow(index, "capital"))?;
        trades.push(Trade::open(timestamp, fill, quantity, commission));

        debug!(timestamp, quantity, fill = %fill, commission = %commission, "entered long");

        Ok(OpenPosition {
            quantity,
            entry_price: fill,
            entry_time: timestamp,
            entry_commission: commission,
            trade_index: trades.len() - 1,
        })
    }

    fn close_position(
        &self,
        open: OpenPosition,
        index: usize,
        timestamp: i64,
        close: Decimal,
        capital: &mut Decimal,
        trades: &mut [Trade],
    ) -> Result<Decimal, TradingError> {
        // slippage_rate < 1, so the exit fill never exceeds the close
        let fill = close * (Decimal::ONE - self.config.slippage_rate);
        let proceeds = fill
            .checked_mul(Decimal::from(open.quantity))
            .ok_or_else(|| overflow(index, "exit proceeds"))?;
        let commission = proceeds * self.config.commission_rate;

        *capital = capital
            .checked_add(proceeds - commission)
            .ok_or_else(|| overflow(index, "capital"))?;

        let trade = trades.get_mut(open.trade_index).ok_or_else(|| {
            TradingError::Internal(format!("no ledger entry at index {}", open.trade_index))
        })?;
        let pnl = trade.close(timestamp, fill, commission)?;

        debug!(
            timestamp,
            entered = open.entry_time,
            quantity = open.quantity,
            fill = %fill,
            total_commission = %open.entry_commission.saturating_add(commission),
            pnl = %pnl,
            "exited long"
        );

        Ok(pnl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::types::{Bar, TradeStatus};
    use serde_json::json;

    fn series_from_closes(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 86_400_000, c, c + 1.0, c - 1.0, c, 1000.0))
            .collect();
        BarSeries::new("TEST", bars).unwrap()
    }

    fn engine(commission: Decimal, slippage: Decimal) -> BacktestEngine {
        BacktestEngine::new(BacktestConfig {
            initial_capital: dec!(10000),
            commission_rate: commission,
            slippage_rate: slippage,
            sizing: SizingMethod::FixedQuantity { quantity: 1 },
        })
    }

    #[test]
    fn test_config_validation() {
        assert!(BacktestConfig::default().validate().is_ok());

        let config = BacktestConfig {
            initial_capital: Decimal::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TradingError::Config(_))));

        let config = BacktestConfig {
            slippage_rate: dec!(-0.1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_slippage_applied_both_ways() {
        let series = series_from_closes(&[100.0, 100.0]);
        let frame = SignalFrame::new(vec![Signal::EnterLong, Signal::ExitLong]);

        let result = engine(Decimal::ZERO, dec!(0.01)).simulate(&series, &frame).unwrap();
        let trade = &result.trades[0];

        assert_eq!(trade.entry_price, dec!(101));
        assert_eq!(trade.exit_price, Some(dec!(99)));
        assert_eq!(trade.pnl, Some(dec!(-2)));
        assert_eq!(result.final_capital, dec!(9998));
        // two bars are too few to annualize
        assert_eq!(result.annualized_return_pct, None);
    }

    #[test]
    fn test_fill_beyond_decimal_range_is_an_error() {
        // representable close, but close * (1 + slippage) is not
        let bars = vec![Bar::new(0, 7e28, 7e28, 7e28, 7e28, 1000.0)];
        let series = BarSeries::new("TEST", bars).unwrap();
        let frame = SignalFrame::new(vec![Signal::EnterLong]);

        let err = engine(Decimal::ZERO, dec!(0.2)).simulate(&series, &frame).unwrap_err();
        assert!(matches!(
            err,
            TradingError::Data(DataError::InvalidBar { index: 0, .. })
        ));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_large_position_value_is_an_error() {
        let series = series_from_closes(&[5e27, 5e27]);
        let frame = SignalFrame::new(vec![Signal::EnterLong, Signal::Hold]);
        let engine = BacktestEngine::new(BacktestConfig {
            initial_capital: dec!(10000),
            commission_rate: Decimal::ZERO,
            slippage_rate: Decimal::ZERO,
            sizing: SizingMethod::FixedQuantity { quantity: 100 },
        });

        assert!(matches!(
            engine.simulate(&series, &frame),
            Err(TradingError::Data(DataError::InvalidBar { index: 0, .. }))
        ));
    }

    #[test]
    fn test_repeated_entry_is_ignored() {
        let series = series_from_closes(&[100.0, 101.0, 102.0, 103.0]);
        let frame = SignalFrame::new(vec![
            Signal::EnterLong,
            Signal::EnterLong,
            Signal::EnterLong,
            Signal::ExitLong,
        ]);

        let result = engine(Decimal::ZERO, Decimal::ZERO).simulate(&series, &frame).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_price, dec!(100));
    }

    #[test]
    fn test_exit_while_flat_is_ignored() {
        let series = series_from_closes(&[100.0, 101.0, 102.0]);
        let frame = SignalFrame::new(vec![Signal::ExitLong, Signal::Undefined, Signal::Hold]);

        let result = engine(Decimal::ZERO, Decimal::ZERO).simulate(&series, &frame).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.metrics.is_none());
        assert_eq!(result.final_capital, dec!(10000));
    }

    #[test]
    fn test_unrealized_pnl_in_equity() {
        let series = series_from_closes(&[100.0, 105.0, 103.0]);
        let frame = SignalFrame::new(vec![Signal::EnterLong, Signal::Hold, Signal::Hold]);

        let result = engine(Decimal::ZERO, Decimal::ZERO).simulate(&series, &frame).unwrap();
        let equity: Vec<Decimal> = result.equity_curve.iter().map(|p| p.equity).collect();

        // cash net of the entry debit plus unrealized P&L
        assert_eq!(equity, vec![dec!(9900), dec!(9905), dec!(10003)]);
        assert_eq!(result.trades[0].status, TradeStatus::Closed);
    }

    #[test]
    fn test_misaligned_frame_rejected() {
        let series = series_from_closes(&[100.0, 101.0]);
        let frame = SignalFrame::new(vec![Signal::Hold]);

        let err = engine(Decimal::ZERO, Decimal::ZERO).simulate(&series, &frame).unwrap_err();
        assert!(matches!(
            err,
            TradingError::Data(DataError::LengthMismatch { bars: 2, signals: 1 })
        ));
    }

    #[test]
    fn test_unknown_strategy_before_config_check() {
        let engine = BacktestEngine::new(BacktestConfig {
            initial_capital: dec!(-1),
            ..Default::default()
        });
        let series = series_from_closes(&[100.0]);

        let err = engine.run("pairs", &json!({}), &series).unwrap_err();
        assert!(matches!(err, TradingError::Strategy(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_run_registered_strategy() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0).collect();
        let series = series_from_closes(&closes);
        let engine = BacktestEngine::new(BacktestConfig::default());

        let result = engine
            .run("momentum", &json!({ "fast_period": 3, "slow_period": 8 }), &series)
            .unwrap();

        assert_eq!(result.strategy, "momentum");
        assert_eq!(result.bars_processed, 60);
        assert!(result.annualized_return_pct.is_some());
        assert!(result.trades.iter().all(|t| t.is_closed()));
    }
}
