//! End-to-end backtest scenarios on hand-built series.

use quant_backtest::{calculate_metrics, BacktestConfig, BacktestEngine, MemorySink, ResultSink};
use quant_core::traits::SignalGenerator;
use quant_core::types::{Bar, BarSeries, EquityPoint, Signal, SignalFrame, TradeStatus};
use quant_core::{StrategyError, TradingError};
use quant_risk::SizingMethod;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

const DAY_MS: i64 = 86_400_000;

fn series_from_closes(closes: &[f64]) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(i as i64 * DAY_MS, c, c * 1.01, c * 0.99, c, 10_000.0))
        .collect();
    BarSeries::new("TEST", bars).unwrap()
}

fn one_unit_engine(commission: Decimal, slippage: Decimal) -> BacktestEngine {
    BacktestEngine::new(BacktestConfig {
        initial_capital: dec!(10000),
        commission_rate: commission,
        slippage_rate: slippage,
        sizing: SizingMethod::FixedQuantity { quantity: 1 },
    })
}

/// A wave with drift, long enough for every built-in strategy to trade.
fn wavy_series(len: usize) -> BarSeries {
    let bars = (0..len)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + (t * 0.15).sin() * 12.0 + (t * 0.9).cos() * 2.0 + t * 0.05;
            let volume = if i % 7 == 0 { 40_000.0 } else { 10_000.0 };
            Bar::new(i as i64 * DAY_MS, close, close * 1.01, close * 0.99, close, volume)
        })
        .collect();
    BarSeries::new("WAVE", bars).unwrap()
}

#[test]
fn scenario_a_frictionless_round_trip() {
    let series = series_from_closes(&[100.0, 110.0]);
    let frame = SignalFrame::new(vec![Signal::EnterLong, Signal::ExitLong]);

    let result = one_unit_engine(Decimal::ZERO, Decimal::ZERO)
        .simulate(&series, &frame)
        .unwrap();

    let trade = &result.trades[0];
    assert_eq!(result.trades.len(), 1);
    assert_eq!(trade.pnl, Some(dec!(10)));
    assert_eq!(trade.pnl_percent, Some(dec!(10)));
    assert_eq!(result.final_capital, result.initial_capital + dec!(10));
    assert_eq!(result.total_return_pct, dec!(0.1));
}

#[test]
fn scenario_b_commission_accounting() {
    let series = series_from_closes(&[100.0, 110.0]);
    let frame = SignalFrame::new(vec![Signal::EnterLong, Signal::ExitLong]);

    let result = one_unit_engine(dec!(0.01), Decimal::ZERO)
        .simulate(&series, &frame)
        .unwrap();

    // entry debits 101
    assert_eq!(result.equity_curve[0].equity, dec!(10000) - dec!(101));
    // exit credits 108.9
    assert_eq!(result.final_capital, dec!(10000) - dec!(101) + dec!(108.9));

    let trade = &result.trades[0];
    assert_eq!(trade.pnl, Some(dec!(7.9)));
    assert_eq!(trade.commission, dec!(2.1));
}

#[test]
fn scenario_c_open_position_is_force_closed() {
    let series = series_from_closes(&[100.0, 104.0, 108.0]);
    let frame = SignalFrame::new(vec![Signal::Undefined, Signal::EnterLong, Signal::Hold]);

    let result = one_unit_engine(dec!(0.001), dec!(0.001))
        .simulate(&series, &frame)
        .unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.status, TradeStatus::Closed);
    assert_eq!(trade.exit_time, Some(2 * DAY_MS));
    assert_eq!(trade.exit_price, Some(dec!(108) * dec!(0.999)));
    assert_eq!(result.equity_curve.last().unwrap().equity, result.final_capital);
    assert!(result.metrics.is_some());
}

#[test]
fn scenario_d_no_trades_means_no_metrics() {
    let series = series_from_closes(&[100.0, 101.0, 99.0, 102.0]);
    let frame = SignalFrame::new(vec![Signal::Undefined, Signal::Hold, Signal::ExitLong, Signal::Hold]);

    let result = one_unit_engine(dec!(0.001), dec!(0.001))
        .simulate(&series, &frame)
        .unwrap();

    assert!(result.trades.is_empty());
    assert!(result.metrics.is_none());
    assert_eq!(result.final_capital, result.initial_capital);
    assert_eq!(result.equity_curve.len(), 4);
}

#[test]
fn scenario_e_flat_equity_zero_ratios() {
    // a breakeven round trip from a frictionless run
    let series = series_from_closes(&[100.0, 100.0]);
    let frame = SignalFrame::new(vec![Signal::EnterLong, Signal::ExitLong]);
    let result = one_unit_engine(Decimal::ZERO, Decimal::ZERO)
        .simulate(&series, &frame)
        .unwrap();

    let flat: Vec<EquityPoint> = (0..30)
        .map(|i| EquityPoint {
            timestamp: i * DAY_MS,
            equity: dec!(10000),
        })
        .collect();
    let metrics = calculate_metrics(&result.trades, &flat).unwrap();

    assert_eq!(metrics.total_trades, 1);
    assert_eq!(metrics.breakeven_trades, 1);
    assert_eq!(metrics.sharpe_ratio, 0.0);
    assert_eq!(metrics.sortino_ratio, 0.0);
    assert_eq!(metrics.max_drawdown_pct, Decimal::ZERO);
    assert_eq!(metrics.profit_factor, Decimal::ZERO);
}

#[test]
fn unknown_strategy_is_rejected() {
    let engine = BacktestEngine::new(BacktestConfig::default());
    let err = engine
        .run("martingale", &json!({}), &wavy_series(10))
        .unwrap_err();

    assert!(matches!(
        err,
        TradingError::Strategy(StrategyError::UnknownStrategy(ref kind)) if kind == "martingale"
    ));
    assert!(err.is_client_error());
}

#[test]
fn empty_series_cannot_be_built() {
    let err = BarSeries::new("EMPTY", vec![]).unwrap_err();
    assert!(TradingError::from(err).is_client_error());
}

#[test]
fn builtin_strategies_satisfy_ledger_invariants() {
    let series = wavy_series(250);
    let engine = BacktestEngine::new(BacktestConfig::default());

    let runs = [
        ("momentum", json!({ "fast_period": 5, "slow_period": 20 })),
        ("momentum", json!({ "fast_period": 5, "slow_period": 20, "ma_type": "ema" })),
        ("mean_reversion", json!({ "period": 15, "std_dev": 1.5, "rsi_period": 7, "rsi_oversold": 40, "rsi_overbought": 60 })),
        ("breakout", json!({ "lookback_period": 10, "breakout_threshold": 0.0, "volume_confirmation": false })),
    ];

    for (kind, params) in runs {
        let result = engine.run(kind, &params, &series).unwrap();

        assert_eq!(result.equity_curve.len(), series.len(), "{kind}");
        assert_eq!(result.bars_processed, series.len());
        assert_eq!(result.equity_curve.last().unwrap().equity, result.final_capital);
        assert!(result.trades.iter().all(|t| t.is_closed()), "{kind}");

        // trades never overlap: each entry comes after the previous exit
        for pair in result.trades.windows(2) {
            assert!(pair[1].entry_time >= pair[0].exit_time.unwrap());
        }

        match &result.metrics {
            Some(m) => {
                assert_eq!(m.total_trades, result.trades.len());
                assert!(m.win_rate_pct >= Decimal::ZERO && m.win_rate_pct <= dec!(100));
                assert!(m.profit_factor >= Decimal::ZERO);
                assert!(m.max_drawdown_pct <= Decimal::ZERO);
                assert!(m.sharpe_ratio.is_finite() && m.sortino_ratio.is_finite());
            }
            None => assert!(result.trades.is_empty()),
        }
    }
}

#[test]
fn trades_follow_flat_to_long_transitions() {
    let series = wavy_series(200);
    let engine = BacktestEngine::new(BacktestConfig::default());
    let params = json!({ "fast_period": 4, "slow_period": 12 });

    let generator = quant_strategies::StrategyRegistry::new()
        .create("momentum", &params)
        .unwrap();
    let frame = generator.generate_signals(&series);

    // count entries the state machine should act on
    let mut long = false;
    let mut expected = 0;
    for signal in &frame.signals {
        match (long, signal) {
            (false, Signal::EnterLong) => {
                long = true;
                expected += 1;
            }
            (true, Signal::ExitLong) => long = false,
            _ => {}
        }
    }

    let result = engine.run("momentum", &params, &series).unwrap();
    assert!(expected > 0);
    assert_eq!(result.trades.len(), expected);
}

#[test]
fn repeated_runs_are_identical() {
    let series = wavy_series(150);
    let engine = BacktestEngine::new(BacktestConfig::default());
    let params = json!({ "period": 12, "rsi_period": 5, "rsi_oversold": 45, "rsi_overbought": 55 });

    let first = engine.run("mean_reversion", &params, &series).unwrap();
    let second = engine.run("mean_reversion", &params, &series).unwrap();

    assert_eq!(first, second);
}

#[test]
fn results_reach_a_sink() {
    let engine = BacktestEngine::new(BacktestConfig::default());
    let result = engine.run("breakout", &json!(null), &wavy_series(60)).unwrap();

    let mut sink = MemorySink::new();
    let id = sink.store(&result).unwrap();

    assert_eq!(id, "run-1");
    assert_eq!(sink.results()[0].1.strategy, "breakout");
}
