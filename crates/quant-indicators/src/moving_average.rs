//! Moving average indicators.

use quant_core::error::StrategyError;
use quant_core::traits::Indicator;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Simple Moving Average (SMA).
///
/// Arithmetic mean of the last N values, computed with a running sum.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let period_f64 = self.period as f64;
        let mut sum: f64 = data[..self.period].iter().sum();
        let mut result = Vec::with_capacity(data.len() - self.period + 1);
        result.push(sum / period_f64);

        for (leaving, entering) in data.iter().zip(&data[self.period..]) {
            sum += entering - leaving;
            result.push(sum / period_f64);
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Smoothing factor 2 / (N + 1), seeded with the SMA of the first N values so
/// the first output lands on the same bar as an SMA of equal period.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
        }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let seed = data[..self.period].iter().sum::<f64>() / self.period as f64;
        let mut result = Vec::with_capacity(data.len() - self.period + 1);
        result.push(seed);

        let mut ema = seed;
        for &price in &data[self.period..] {
            ema += self.alpha * (price - ema);
            result.push(ema);
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

/// Moving average flavour selectable from strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    #[default]
    Sma,
    Ema,
}

impl MaType {
    /// Compute this moving average over `data`.
    pub fn calculate(&self, period: usize, data: &[f64]) -> Vec<f64> {
        match self {
            MaType::Sma => Sma::new(period).calculate(data),
            MaType::Ema => Ema::new(period).calculate(data),
        }
    }
}

impl FromStr for MaType {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sma" => Ok(MaType::Sma),
            "ema" => Ok(MaType::Ema),
            _ => Err(StrategyError::InvalidMaType(s.to_string())),
        }
    }
}

impl std::fmt::Display for MaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaType::Sma => write!(f, "sma"),
            MaType::Ema => write!(f, "ema"),
        }
    }
}
