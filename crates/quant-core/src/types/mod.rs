//! Core data types for the backtesting engine.

mod ohlcv;
mod signal;
mod trade;

pub use ohlcv::{Bar, BarSeries};
pub use signal::{IndicatorColumn, Signal, SignalFrame};
pub use trade::{EquityPoint, Side, Trade, TradeStatus};
