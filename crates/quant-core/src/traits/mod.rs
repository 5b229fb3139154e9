//! Core traits for the backtesting engine.

mod data_source;
mod indicator;
mod strategy;

pub use data_source::MarketDataSource;
pub use indicator::{aligned, Indicator, MultiOutputIndicator};
pub use strategy::{SignalGenerator, StrategyConfig};
