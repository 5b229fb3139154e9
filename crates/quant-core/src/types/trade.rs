//! Trade ledger types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradingError;

/// Trade side. The engine is long-only, so every trade opens with a buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle state of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// One round trip in the ledger.
///
/// Created open when a position is entered and closed exactly once when it is
/// exited. Exit fields stay `None` while the trade is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Entry bar timestamp (Unix milliseconds)
    pub entry_time: i64,
    /// Entry fill price, slippage included
    pub entry_price: Decimal,
    /// Number of units held
    pub quantity: u64,
    pub side: Side,
    /// Entry commission, plus exit commission once closed
    pub commission: Decimal,
    pub exit_time: Option<i64>,
    pub exit_price: Option<Decimal>,
    /// Realized P&L net of both commissions
    pub pnl: Option<Decimal>,
    /// Realized P&L as a percentage of the entry cost
    pub pnl_percent: Option<Decimal>,
    pub status: TradeStatus,
}

impl Trade {
    /// Open a new long trade.
    pub fn open(entry_time: i64, entry_price: Decimal, quantity: u64, commission: Decimal) -> Self {
        Self {
            entry_time,
            entry_price,
            quantity,
            side: Side::Buy,
            commission,
            exit_time: None,
            exit_price: None,
            pnl: None,
            pnl_percent: None,
            status: TradeStatus::Open,
        }
    }

    /// Check whether the trade has been closed.
    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// Entry cost basis (entry price times quantity).
    pub fn cost_basis(&self) -> Decimal {
        self.entry_price * Decimal::from(self.quantity)
    }

    /// Close the trade and return its realized P&L.
    ///
    /// Fails if the trade was already closed; a closed trade is immutable.
    pub fn close(
        &mut self,
        exit_time: i64,
        exit_price: Decimal,
        exit_commission: Decimal,
    ) -> Result<Decimal, TradingError> {
        if self.is_closed() {
            return Err(TradingError::Internal(format!(
                "trade entered at {} is already closed",
                self.entry_time
            )));
        }

        let overflow = || {
            TradingError::Internal(format!(
                "P&L of trade entered at {} overflows the decimal range",
                self.entry_time
            ))
        };
        let quantity = Decimal::from(self.quantity);
        let total_commission = self
            .commission
            .checked_add(exit_commission)
            .ok_or_else(overflow)?;
        let pnl = exit_price
            .checked_sub(self.entry_price)
            .and_then(|move_per_unit| move_per_unit.checked_mul(quantity))
            .and_then(|gross| gross.checked_sub(total_commission))
            .ok_or_else(overflow)?;
        let cost_basis = self
            .entry_price
            .checked_mul(quantity)
            .ok_or_else(overflow)?;
        let pnl_percent = if cost_basis.is_zero() {
            Decimal::ZERO
        } else {
            pnl.checked_div(cost_basis)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(overflow)?
        };

        self.exit_time = Some(exit_time);
        self.exit_price = Some(exit_price);
        self.commission = total_commission;
        self.pnl = Some(pnl);
        self.pnl_percent = Some(pnl_percent);
        self.status = TradeStatus::Closed;

        Ok(pnl)
    }
}

/// One point of the equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Bar timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Cash plus unrealized P&L of any open position
    pub equity: Decimal,
}
