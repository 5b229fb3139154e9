//! Signal generator trait definitions.

use crate::error::StrategyError;
use crate::types::{BarSeries, SignalFrame};

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Core strategy trait.
///
/// A signal generator is a pure transform from a bar series to one signal per
/// bar. It holds only its validated parameters, never simulation state, so
/// the same instance can be shared across runs and threads.
pub trait SignalGenerator: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }

    /// Number of leading bars that will carry `Signal::Undefined`.
    fn warmup_period(&self) -> usize;

    /// Compute signals and indicator columns for every bar of `series`.
    fn generate_signals(&self, series: &BarSeries) -> SignalFrame;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bar, Signal};

    struct AlwaysHold {
        warmup: usize,
    }

    impl SignalGenerator for AlwaysHold {
        fn name(&self) -> &str {
            "always_hold"
        }

        fn warmup_period(&self) -> usize {
            self.warmup
        }

        fn generate_signals(&self, series: &BarSeries) -> SignalFrame {
            let signals = (0..series.len())
                .map(|i| {
                    if i < self.warmup {
                        Signal::Undefined
                    } else {
                        Signal::Hold
                    }
                })
                .collect();
            SignalFrame::new(signals)
        }
    }

    #[test]
    fn test_generator_respects_warmup() {
        let bars = (0..5)
            .map(|i| Bar::new(i, 10.0, 11.0, 9.0, 10.0, 100.0))
            .collect();
        let series = BarSeries::new("TEST", bars).unwrap();
        let generator = AlwaysHold { warmup: 2 };

        let frame = generator.generate_signals(&series);
        assert_eq!(frame.count(Signal::Undefined), generator.warmup_period());
        assert_eq!(frame.count(Signal::Hold), 3);
        assert_eq!(generator.description(), "");
    }
}
