//! Bucket aggregates: named, ordered collections of trades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TradebucketsError;
use super::trade::Trade;

/// A named collection of trades. `trades` keeps insertion order, which is
/// also display order. `total_profit_and_loss` is derived on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub id: String,
    pub name: String,
    pub trades: Vec<Trade>,
    pub total_profit_and_loss: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bucket {
    pub fn new(id: String, name: String, trades: Vec<Trade>, now: DateTime<Utc>) -> Self {
        Bucket {
            id,
            name,
            trades,
            total_profit_and_loss: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn trade(&self, trade_id: &str) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == trade_id)
    }

    pub fn trade_mut(&mut self, trade_id: &str) -> Option<&mut Trade> {
        self.trades.iter_mut().find(|t| t.id == trade_id)
    }

    /// Re-derive every member trade, then the bucket total. The total is
    /// always recomputed in full, never incrementally.
    pub fn recompute(&mut self) -> Result<(), TradebucketsError> {
        for trade in &mut self.trades {
            trade.recompute_profit_and_loss()?;
        }
        self.total_profit_and_loss = self.trades.iter().map(|t| t.profit_and_loss).sum();
        Ok(())
    }
}
