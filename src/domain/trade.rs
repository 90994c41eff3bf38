//! Trade records and profit/loss derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TradebucketsError;

/// Position lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(TradeStatus::Open),
            "closed" => Some(TradeStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single position entry. Sign of `qty` encodes direction: positive is
/// long, negative is short. `sell_price` is `Some` exactly when the position
/// is closed; `profit_and_loss` is derived, never taken from a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub instrument: String,
    pub qty: f64,
    pub avg: f64,
    pub ltp: f64,
    pub status: TradeStatus,
    pub sell_price: Option<f64>,
    pub profit_and_loss: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    pub fn is_long(&self) -> bool {
        self.qty > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.qty < 0.0
    }

    /// Price the P&L is measured against: last traded price while open,
    /// sell price once closed.
    fn reference_price(&self) -> Result<f64, TradebucketsError> {
        match self.status {
            TradeStatus::Open => Ok(self.ltp),
            TradeStatus::Closed => {
                self.sell_price
                    .ok_or_else(|| TradebucketsError::Derivation {
                        reason: "sellPrice is required for closed positions".to_string(),
                    })
            }
        }
    }

    /// Recompute `profit_and_loss` from the current fields.
    ///
    /// Runs before every persistence write, and re-checks the closed/sell
    /// price precondition itself so it is also safe to call on a directly
    /// mutated record. A short position gains when the price falls below the
    /// entry average.
    pub fn recompute_profit_and_loss(&mut self) -> Result<(), TradebucketsError> {
        let reference = self.reference_price()?;
        self.profit_and_loss = if self.qty > 0.0 {
            (reference - self.avg) * self.qty
        } else {
            (self.avg - reference) * -self.qty
        };
        Ok(())
    }
}
