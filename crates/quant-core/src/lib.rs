//! Core types and traits for the backtesting engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries)
//! - Trading signals and signal frames
//! - The trade ledger and equity curve types
//! - Core traits for signal generators, indicators and data sources

pub mod types;
pub mod traits;
pub mod error;

pub use error::{DataError, StrategyError, TradingError, TradingResult};
pub use types::*;
pub use traits::*;
