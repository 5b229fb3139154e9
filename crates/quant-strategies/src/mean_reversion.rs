//! Mean Reversion Strategy using Bollinger Bands and RSI.
//!
//! Buys when price closes at or under the lower band while RSI is oversold,
//! sells when price closes at or over the upper band while RSI is overbought.

use quant_core::{
    error::StrategyError,
    traits::{aligned, Indicator, MultiOutputIndicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, Signal, SignalFrame},
};
use quant_indicators::{BollingerBands, Rsi};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::params::{decode, parameter_map};

/// Configuration for the Mean Reversion strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionConfig {
    /// Bollinger Bands period
    pub period: usize,
    /// Band width in standard deviations
    #[serde(alias = "num_std")]
    pub std_dev: f64,
    /// RSI lookback
    pub rsi_period: usize,
    /// RSI level below which the market is oversold
    pub rsi_oversold: f64,
    /// RSI level above which the market is overbought
    pub rsi_overbought: f64,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl MeanReversionConfig {
    pub fn from_params(params: &Value) -> Result<Self, StrategyError> {
        decode(parameter_map(params)?)
    }
}

impl StrategyConfig for MeanReversionConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "period must be at least 2".into(),
            ));
        }
        if !(self.std_dev.is_finite() && self.std_dev > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "std_dev must be positive".into(),
            ));
        }
        if self.rsi_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "rsi_period must be greater than 0".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(StrategyError::InvalidConfig(format!(
                "RSI thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        Ok(())
    }
}

/// Mean Reversion Strategy using Bollinger Bands with an RSI filter.
#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
    bb: BollingerBands,
    rsi: Rsi,
}

impl MeanReversionStrategy {
    /// Create a new Mean Reversion strategy.
    pub fn new(config: MeanReversionConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let bb = BollingerBands::with_params(config.period, config.std_dev);
        let rsi = Rsi::new(config.rsi_period);
        Ok(Self { config, bb, rsi })
    }

    pub fn config(&self) -> &MeanReversionConfig {
        &self.config
    }
}

impl SignalGenerator for MeanReversionStrategy {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn description(&self) -> &str {
        "Trades reversions to the mean using Bollinger Bands confirmed by RSI"
    }

    fn warmup_period(&self) -> usize {
        (self.config.period - 1).max(self.config.rsi_period)
    }

    fn generate_signals(&self, series: &BarSeries) -> SignalFrame {
        let closes = series.closes();
        let n = closes.len();

        let bands = aligned(&self.bb.calculate(&closes), n);
        let rsi = aligned(&self.rsi.calculate(&closes), n);

        let signals: Vec<Signal> = closes
            .iter()
            .zip(bands.iter().zip(&rsi))
            .map(|(&close, pair)| match pair {
                (Some(band), Some(rsi)) => {
                    if close <= band.lower && *rsi < self.config.rsi_oversold {
                        Signal::EnterLong
                    } else if close >= band.upper && *rsi > self.config.rsi_overbought {
                        Signal::ExitLong
                    } else {
                        Signal::Hold
                    }
                }
                _ => Signal::Undefined,
            })
            .collect();

        debug!(
            symbol = %series.symbol,
            bars = n,
            entries = signals.iter().filter(|s| **s == Signal::EnterLong).count(),
            exits = signals.iter().filter(|s| **s == Signal::ExitLong).count(),
            "mean reversion signals generated"
        );

        SignalFrame::new(signals)
            .with_indicator("middle_band", bands.iter().map(|b| b.map(|b| b.middle)).collect())
            .with_indicator("upper_band", bands.iter().map(|b| b.map(|b| b.upper)).collect())
            .with_indicator("lower_band", bands.iter().map(|b| b.map(|b| b.lower)).collect())
            .with_indicator("rsi", rsi)
    }
}
