//! Technical indicators.
//!
//! This crate provides batch implementations of the indicators the built-in
//! strategies use:
//! - Moving averages (SMA, EMA)
//! - Momentum (RSI)
//! - Volatility (sample standard deviation, Bollinger Bands)
//! - Price channels (rolling max / min)
//!
//! Every indicator returns a compact vector starting at the first index where
//! its lookback window is filled; see `quant_core::aligned`.

pub mod channel;
pub mod momentum;
pub mod moving_average;
pub mod volatility;

pub use channel::{RollingMax, RollingMin};
pub use momentum::Rsi;
pub use moving_average::{Ema, MaType, Sma};
pub use volatility::{BollingerBands, BollingerOutput, StdDev};
