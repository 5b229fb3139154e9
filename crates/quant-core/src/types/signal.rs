//! Trading signals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DataError;

/// Per-bar trading decision emitted by a signal generator.
///
/// `Undefined` marks bars where the generator could not decide (usually an
/// unfilled lookback window). It is distinct from `Hold`: the engine never
/// changes state on either, but reports and tests can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    EnterLong,
    ExitLong,
    Hold,
    #[default]
    Undefined,
}

impl Signal {
    /// Whether the generator produced a decision for this bar.
    #[inline]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Signal::Undefined)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::EnterLong => write!(f, "ENTER_LONG"),
            Signal::ExitLong => write!(f, "EXIT_LONG"),
            Signal::Hold => write!(f, "HOLD"),
            Signal::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

/// Indicator column aligned with the bar series (`None` while undefined).
pub type IndicatorColumn = Vec<Option<f64>>;

/// Output of a signal generator: one signal per bar plus the indicator
/// columns the decision was based on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalFrame {
    /// One signal per bar, in bar order
    pub signals: Vec<Signal>,
    /// Named indicator columns, each the same length as `signals`
    pub indicators: BTreeMap<String, IndicatorColumn>,
}

impl SignalFrame {
    /// Create a frame from raw signals with no indicator columns.
    pub fn new(signals: Vec<Signal>) -> Self {
        Self {
            signals,
            indicators: BTreeMap::new(),
        }
    }

    /// Attach an indicator column.
    pub fn with_indicator(mut self, name: impl Into<String>, column: IndicatorColumn) -> Self {
        self.indicators.insert(name.into(), column);
        self
    }

    /// Number of bars covered.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Check if the frame covers no bars.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Get an indicator column by name.
    pub fn indicator(&self, name: &str) -> Option<&IndicatorColumn> {
        self.indicators.get(name)
    }

    /// Count bars carrying the given signal.
    pub fn count(&self, signal: Signal) -> usize {
        self.signals.iter().filter(|&&s| s == signal).count()
    }

    /// Ensure the frame lines up with a bar series of `bars` entries.
    pub fn check_alignment(&self, bars: usize) -> Result<(), DataError> {
        if self.signals.len() != bars {
            return Err(DataError::LengthMismatch {
                bars,
                signals: self.signals.len(),
            });
        }
        for column in self.indicators.values() {
            if column.len() != bars {
                return Err(DataError::LengthMismatch {
                    bars,
                    signals: column.len(),
                });
            }
        }
        Ok(())
    }
}
