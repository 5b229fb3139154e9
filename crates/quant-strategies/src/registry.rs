//! Strategy registry for building signal generators by name.

use quant_core::{error::StrategyError, traits::SignalGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::{
    BreakoutConfig, BreakoutStrategy, MeanReversionConfig, MeanReversionStrategy, MomentumConfig,
    MomentumStrategy,
};

/// The closed set of built-in strategy kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Momentum,
    MeanReversion,
    Breakout,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Momentum,
        StrategyKind::MeanReversion,
        StrategyKind::Breakout,
    ];

    /// Identifier used in parameters and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Momentum => "momentum",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::Breakout => "breakout",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StrategyError::UnknownStrategy(s.to_string()))
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy identifier
    pub kind: StrategyKind,
    /// Display name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: Value,
}

/// Registry for available strategies.
pub struct StrategyRegistry {
    strategies: Vec<StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let momentum = MomentumConfig::default();
        let mean_reversion = MeanReversionConfig::default();
        let breakout = BreakoutConfig::default();

        let strategies = vec![
            StrategyInfo {
                kind: StrategyKind::Momentum,
                name: "Momentum".to_string(),
                description: "Fast/slow moving average trend following (SMA or EMA)".to_string(),
                default_config: serde_json::json!({
                    "fast_period": momentum.fast_period,
                    "slow_period": momentum.slow_period,
                    "ma_type": momentum.ma_type.to_string(),
                }),
            },
            StrategyInfo {
                kind: StrategyKind::MeanReversion,
                name: "Mean Reversion".to_string(),
                description: "Bollinger Band reversals confirmed by RSI extremes".to_string(),
                default_config: serde_json::json!({
                    "period": mean_reversion.period,
                    "std_dev": mean_reversion.std_dev,
                    "rsi_period": mean_reversion.rsi_period,
                    "rsi_oversold": mean_reversion.rsi_oversold,
                    "rsi_overbought": mean_reversion.rsi_overbought,
                }),
            },
            StrategyInfo {
                kind: StrategyKind::Breakout,
                name: "Breakout".to_string(),
                description: "Support/resistance channel breakouts with volume confirmation"
                    .to_string(),
                default_config: serde_json::json!({
                    "lookback_period": breakout.lookback_period,
                    "breakout_threshold": breakout.breakout_threshold,
                    "volume_confirmation": breakout.volume_confirmation,
                    "volume_multiplier": breakout.volume_multiplier,
                }),
            },
        ];

        Self { strategies }
    }

    /// List all available strategies, in registration order.
    pub fn list(&self) -> &[StrategyInfo] {
        &self.strategies
    }

    /// Get strategy info by identifier.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.iter().find(|info| info.kind.as_str() == name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Build a generator from its identifier and JSON parameters.
    ///
    /// Unknown identifiers fail before the parameters are looked at.
    pub fn create(
        &self,
        name: &str,
        params: &Value,
    ) -> Result<Box<dyn SignalGenerator>, StrategyError> {
        let kind: StrategyKind = name.parse()?;
        self.create_kind(kind, params)
    }

    /// Build a generator for an already-parsed kind.
    pub fn create_kind(
        &self,
        kind: StrategyKind,
        params: &Value,
    ) -> Result<Box<dyn SignalGenerator>, StrategyError> {
        Ok(match kind {
            StrategyKind::Momentum => {
                Box::new(MomentumStrategy::new(MomentumConfig::from_params(params)?)?)
            }
            StrategyKind::MeanReversion => Box::new(MeanReversionStrategy::new(
                MeanReversionConfig::from_params(params)?,
            )?),
            StrategyKind::Breakout => {
                Box::new(BreakoutStrategy::new(BreakoutConfig::from_params(params)?)?)
            }
        })
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, name: &str) -> Result<Box<dyn SignalGenerator>, StrategyError> {
        self.create(name, &Value::Null)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
