//! Channel breakout strategy.
//!
//! Resistance and support are the highest high and lowest low of the
//! `lookback_period` bars before the current one. A close beyond either level
//! by more than `breakout_threshold` produces a signal, optionally gated on
//! above-average volume.

use quant_core::{
    error::StrategyError,
    traits::{Indicator, SignalGenerator, StrategyConfig},
    types::{BarSeries, IndicatorColumn, Signal, SignalFrame},
};
use quant_indicators::{RollingMax, RollingMin, Sma};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::params::{decode, parameter_map};

/// Configuration for the Breakout strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    /// Number of preceding bars forming the channel
    pub lookback_period: usize,
    /// Fractional distance beyond the channel required to trigger
    pub breakout_threshold: f64,
    /// Require above-average volume for a signal
    pub volume_confirmation: bool,
    /// Volume must exceed this multiple of the average
    pub volume_multiplier: f64,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            lookback_period: 20,
            breakout_threshold: 0.02,
            volume_confirmation: true,
            volume_multiplier: 1.5,
        }
    }
}

impl BreakoutConfig {
    pub fn from_params(params: &Value) -> Result<Self, StrategyError> {
        decode(parameter_map(params)?)
    }
}

impl StrategyConfig for BreakoutConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "lookback_period must be greater than 0".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.breakout_threshold) {
            return Err(StrategyError::InvalidConfig(format!(
                "breakout_threshold must be in [0, 1), got {}",
                self.breakout_threshold
            )));
        }
        if !(self.volume_multiplier.is_finite() && self.volume_multiplier > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "volume_multiplier must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Shift a compact rolling output so bar `i` sees the window ending at `i - 1`.
fn preceding(values: &[f64], lookback: usize, len: usize) -> IndicatorColumn {
    std::iter::repeat(None)
        .take(lookback)
        .chain(values.iter().copied().map(Some))
        .take(len)
        .collect()
}

/// Channel breakout with optional volume confirmation.
#[derive(Debug, Clone)]
pub struct BreakoutStrategy {
    config: BreakoutConfig,
}

impl BreakoutStrategy {
    pub fn new(config: BreakoutConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BreakoutConfig {
        &self.config
    }

    fn volume_confirmed(&self, volume: f64, avg_volume: f64) -> bool {
        !self.config.volume_confirmation || volume > self.config.volume_multiplier * avg_volume
    }
}

impl SignalGenerator for BreakoutStrategy {
    fn name(&self) -> &str {
        "breakout"
    }

    fn description(&self) -> &str {
        "Enters on a close above recent resistance and exits below recent support"
    }

    fn warmup_period(&self) -> usize {
        self.config.lookback_period
    }

    fn generate_signals(&self, series: &BarSeries) -> SignalFrame {
        let n = series.len();
        let lookback = self.config.lookback_period;
        let t = self.config.breakout_threshold;

        let resistance = preceding(&RollingMax::new(lookback).calculate(&series.highs()), lookback, n);
        let support = preceding(&RollingMin::new(lookback).calculate(&series.lows()), lookback, n);
        let avg_volume = preceding(&Sma::new(lookback).calculate(&series.volumes()), lookback, n);

        let mut gated = 0usize;
        let signals: Vec<Signal> = series
            .iter()
            .enumerate()
            .map(|(i, bar)| match (resistance[i], support[i], avg_volume[i]) {
                (Some(res), Some(sup), Some(avg)) => {
                    let candidate = if bar.close > res * (1.0 + t) {
                        Signal::EnterLong
                    } else if bar.close < sup * (1.0 - t) {
                        Signal::ExitLong
                    } else {
                        return Signal::Hold;
                    };
                    if self.volume_confirmed(bar.volume, avg) {
                        candidate
                    } else {
                        gated += 1;
                        Signal::Hold
                    }
                }
                _ => Signal::Undefined,
            })
            .collect();

        debug!(
            symbol = %series.symbol,
            bars = n,
            gated_by_volume = gated,
            "breakout signals generated"
        );

        SignalFrame::new(signals)
            .with_indicator("resistance", resistance)
            .with_indicator("support", support)
            .with_indicator("avg_volume", avg_volume)
    }
}
