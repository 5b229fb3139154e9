//! Error types for the backtesting engine.

use thiserror::Error;

/// Top-level error returned by backtest runs.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TradingError {
    /// Whether the failure was caused by the caller's input (bad strategy
    /// configuration or malformed bar data) rather than by the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TradingError::Config(_) | TradingError::Strategy(_) | TradingError::Data(_)
        )
    }
}

/// Strategy configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid moving-average type: {0} (expected \"sma\" or \"ema\")")]
    InvalidMaType(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Market data errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Bar series is empty")]
    EmptySeries,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Timestamps must be strictly increasing: bar {index} has {current}, previous bar has {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("Signal frame length {signals} does not match bar series length {bars}")]
    LengthMismatch { bars: usize, signals: usize },

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type alias for backtest operations.
pub type TradingResult<T> = Result<T, TradingError>;
