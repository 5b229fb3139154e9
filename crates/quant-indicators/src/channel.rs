//! Price channel indicators (rolling extremes).

use quant_core::traits::Indicator;

/// Highest value over the last N points (resistance when fed highs).
#[derive(Debug, Clone)]
pub struct RollingMax {
    period: usize,
}

impl RollingMax {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for RollingMax {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }
        data.windows(self.period)
            .map(|w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "RollingMax"
    }
}

/// Lowest value over the last N points (support when fed lows).
#[derive(Debug, Clone)]
pub struct RollingMin {
    period: usize,
}

impl RollingMin {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for RollingMin {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }
        data.windows(self.period)
            .map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "RollingMin"
    }
}
