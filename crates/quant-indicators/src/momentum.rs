//! Momentum indicators.

use quant_core::traits::Indicator;

/// Relative Strength Index (RSI).
///
/// Uses simple rolling means of gains and losses over the last `period`
/// close-to-close changes:
/// RSI = 100 - 100 / (1 + avg_gain / avg_loss).
/// When avg_loss is 0 the RSI is 100, so a window with no down moves
/// (including a flat window) reads as maximally strong.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = data
            .windows(2)
            .map(|w| {
                let change = w[1] - w[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let period_f64 = self.period as f64;
        gains
            .windows(self.period)
            .zip(losses.windows(self.period))
            .map(|(g, l)| {
                let avg_gain = g.iter().sum::<f64>() / period_f64;
                let avg_loss = l.iter().sum::<f64>() / period_f64;
                Self::from_averages(avg_gain, avg_loss)
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}
