//! Momentum (moving average trend) strategy.
//!
//! Long while the fast moving average is above the slow one, out while it is
//! below. The signal is a level, so consecutive bars repeat it; the engine
//! only acts on state transitions.

use quant_core::{
    error::StrategyError,
    traits::{aligned, SignalGenerator, StrategyConfig},
    types::{BarSeries, Signal, SignalFrame},
};
use quant_indicators::MaType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::params::{decode, parameter_map};

/// Configuration for the Momentum strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Fast MA period
    pub fast_period: usize,
    /// Slow MA period
    pub slow_period: usize,
    /// Moving average flavour, parsed separately so a bad value reports the
    /// offending string
    #[serde(skip_deserializing)]
    pub ma_type: MaType,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 30,
            ma_type: MaType::Sma,
        }
    }
}

impl MomentumConfig {
    /// Build a config from JSON parameters, filling unspecified keys with
    /// defaults.
    pub fn from_params(params: &Value) -> Result<Self, StrategyError> {
        let mut map = parameter_map(params)?;
        let ma_type = match map.remove("ma_type") {
            None => MaType::default(),
            Some(Value::String(s)) => s.parse()?,
            Some(other) => return Err(StrategyError::InvalidMaType(other.to_string())),
        };

        let mut config: MomentumConfig = decode(map)?;
        config.ma_type = ma_type;
        Ok(config)
    }
}

impl StrategyConfig for MomentumConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "fast_period must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(format!(
                "fast_period ({}) must be less than slow_period ({})",
                self.fast_period, self.slow_period
            )));
        }
        Ok(())
    }
}

/// Moving average crossover trend follower.
#[derive(Debug, Clone)]
pub struct MomentumStrategy {
    config: MomentumConfig,
}

impl MomentumStrategy {
    /// Create a strategy from a validated configuration.
    pub fn new(config: MomentumConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }
}

impl SignalGenerator for MomentumStrategy {
    fn name(&self) -> &str {
        "momentum"
    }

    fn description(&self) -> &str {
        "Long while the fast moving average is above the slow moving average"
    }

    fn warmup_period(&self) -> usize {
        self.config.slow_period - 1
    }

    fn generate_signals(&self, series: &BarSeries) -> SignalFrame {
        let closes = series.closes();
        let n = closes.len();
        let ma = self.config.ma_type;

        let fast = aligned(&ma.calculate(self.config.fast_period, &closes), n);
        let slow = aligned(&ma.calculate(self.config.slow_period, &closes), n);

        let signals: Vec<Signal> = fast
            .iter()
            .zip(&slow)
            .map(|pair| match pair {
                (Some(f), Some(s)) if f > s => Signal::EnterLong,
                (Some(f), Some(s)) if f < s => Signal::ExitLong,
                (Some(_), Some(_)) => Signal::Hold,
                _ => Signal::Undefined,
            })
            .collect();

        debug!(
            symbol = %series.symbol,
            ma_type = %ma,
            bars = n,
            defined = n - signals.iter().filter(|s| !s.is_defined()).count(),
            "momentum signals generated"
        );

        SignalFrame::new(signals)
            .with_indicator("fast_ma", fast)
            .with_indicator("slow_ma", slow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_core::types::Bar;
    use serde_json::json;

    fn create_test_series(prices: &[f64]) -> BarSeries {
        let bars = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Bar::new(i as i64 * 86_400_000, p, p + 1.0, p - 1.0, p, 1000.0))
            .collect();
        BarSeries::new("TEST", bars).unwrap()
    }

    fn strategy(fast: usize, slow: usize, ma_type: &str) -> MomentumStrategy {
        let config = MomentumConfig::from_params(&json!({
            "fast_period": fast,
            "slow_period": slow,
            "ma_type": ma_type,
        }))
        .unwrap();
        MomentumStrategy::new(config).unwrap()
    }

    #[test]
    fn test_defaults_from_empty_params() {
        let config = MomentumConfig::from_params(&json!({})).unwrap();
        assert_eq!(config, MomentumConfig::default());
    }

    #[test]
    fn test_invalid_ma_type() {
        assert_eq!(
            MomentumConfig::from_params(&json!({ "ma_type": "wma" })),
            Err(StrategyError::InvalidMaType("wma".into()))
        );
        assert!(matches!(
            MomentumConfig::from_params(&json!({ "ma_type": 3 })),
            Err(StrategyError::InvalidMaType(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let config = MomentumConfig {
            fast_period: 30,
            slow_period: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(MomentumStrategy::new(config).is_err());

        let config = MomentumConfig {
            fast_period: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_uptrend_then_downtrend() {
        let mut prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        prices.extend((0..10).map(|i| 109.0 - 2.0 * i as f64));
        let series = create_test_series(&prices);

        let frame = strategy(2, 4, "sma").generate_signals(&series);

        assert_eq!(frame.len(), prices.len());
        assert!(frame.signals[..3].iter().all(|s| *s == Signal::Undefined));
        assert_eq!(frame.signals[3], Signal::EnterLong);
        assert_eq!(*frame.signals.last().unwrap(), Signal::ExitLong);
        assert_eq!(frame.indicator("fast_ma").unwrap().len(), prices.len());
    }

    #[test]
    fn test_flat_prices_hold() {
        let series = create_test_series(&[50.0; 12]);
        for ma_type in ["sma", "ema"] {
            let frame = strategy(3, 5, ma_type).generate_signals(&series);
            assert_eq!(frame.count(Signal::Undefined), 4);
            assert_eq!(frame.count(Signal::Hold), 8);
        }
    }

    #[test]
    fn test_short_series_is_all_undefined() {
        let series = create_test_series(&[1.0, 2.0, 3.0]);
        let frame = strategy(2, 5, "ema").generate_signals(&series);
        assert_eq!(frame.count(Signal::Undefined), 3);
    }
}
