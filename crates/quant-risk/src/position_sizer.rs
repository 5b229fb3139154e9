//! Position sizing algorithms.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Position sizing method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SizingMethod {
    /// Commit a fraction of current capital per entry
    RiskFraction { fraction: Decimal },
    /// Fixed number of units per entry
    FixedQuantity { quantity: u64 },
}

impl Default for SizingMethod {
    fn default() -> Self {
        SizingMethod::RiskFraction {
            fraction: dec!(0.02),
        }
    }
}

impl SizingMethod {
    /// Check the method's parameters.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            SizingMethod::RiskFraction { fraction } => {
                if *fraction <= Decimal::ZERO || *fraction > Decimal::ONE {
                    return Err(format!("risk fraction must be in (0, 1], got {fraction}"));
                }
            }
            SizingMethod::FixedQuantity { quantity } => {
                if *quantity == 0 {
                    return Err("fixed quantity must be at least 1".into());
                }
            }
        }
        Ok(())
    }
}

/// Position sizer calculates the quantity to buy on entry.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    method: SizingMethod,
}

impl PositionSizer {
    /// Create a new position sizer.
    pub fn new(method: SizingMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> &SizingMethod {
        &self.method
    }

    /// Calculate position size in whole units, never less than 1.
    ///
    /// Margin is not modelled, so the minimum unit may cost more than the
    /// available capital.
    pub fn calculate(&self, capital: Decimal, price: Decimal) -> u64 {
        let quantity = match self.method {
            SizingMethod::FixedQuantity { quantity } => quantity,
            SizingMethod::RiskFraction { fraction } => {
                if price <= Decimal::ZERO || capital <= Decimal::ZERO {
                    0
                } else {
                    capital
                        .checked_mul(fraction)
                        .and_then(|budget| budget.checked_div(price))
                        .and_then(|units| units.floor().to_u64())
                        .unwrap_or(u64::MAX)
                }
            }
        };

        let quantity = quantity.max(1);
        trace!(%capital, %price, quantity, "position sized");
        quantity
    }
}
