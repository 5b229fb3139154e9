//! Volatility indicators.

use quant_core::traits::{Indicator, MultiOutputIndicator};
use serde::{Deserialize, Serialize};

/// Sample mean and sample standard deviation (n - 1 denominator) of a window.
fn mean_and_sample_std(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Rolling sample standard deviation.
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        Self { period }
    }
}

impl Indicator for StdDev {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        data.windows(self.period)
            .map(|window| mean_and_sample_std(window).1)
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
}

impl BollingerOutput {
    /// Check if price is at or above the upper band.
    pub fn is_overbought(&self, price: f64) -> bool {
        price >= self.upper
    }

    /// Check if price is at or below the lower band.
    pub fn is_oversold(&self, price: f64) -> bool {
        price <= self.lower
    }
}

/// Bollinger Bands.
///
/// A middle band (SMA) with upper and lower bands a multiple of the rolling
/// sample standard deviation away.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::with_params(20, 2.0)
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Outputs = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<BollingerOutput> {
        if data.len() < self.period {
            return vec![];
        }

        data.windows(self.period)
            .map(|window| {
                let (middle, std_dev) = mean_and_sample_std(window);
                let width = self.std_dev_multiplier * std_dev;
                BollingerOutput {
                    upper: middle + width,
                    middle,
                    lower: middle - width,
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_dev_is_sample() {
        let std = StdDev::new(4);
        let values = std.calculate(&[2.0, 4.0, 4.0, 6.0]);
        // mean 4, squared deviations 4+0+0+4 = 8, / 3
        assert_eq!(values.len(), 1);
        assert!((values[0] - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_bands() {
        let bb = BollingerBands::with_params(4, 2.0);
        let out = bb.calculate(&[2.0, 4.0, 4.0, 6.0, 8.0]);

        assert_eq!(out.len(), 2);
        let width = 2.0 * (8.0f64 / 3.0).sqrt();
        assert!((out[0].middle - 4.0).abs() < 1e-12);
        assert!((out[0].upper - (4.0 + width)).abs() < 1e-12);
        assert!((out[0].lower - (4.0 - width)).abs() < 1e-12);
        assert!(out[0].is_oversold(out[0].lower));
        assert!(!out[0].is_overbought(out[0].middle));
    }

    #[test]
    fn test_flat_series_collapses_bands() {
        let bb = BollingerBands::default();
        let out = bb.calculate(&[50.0; 25]);

        assert_eq!(out.len(), 6);
        for band in out {
            assert_eq!(band.upper, band.lower);
            assert_eq!(band.middle, 50.0);
        }
    }
}
