//! Trade payload validation.
//!
//! All rules are applied independently and every failure is collected, so a
//! caller sees the full error list in one response rather than the first
//! failure only.

use serde::Deserialize;

use super::trade::TradeStatus;

/// An untrusted trade payload as submitted by a client.
///
/// Field absence is preserved (everything is `Option`) so validation can
/// report it, and `status` stays a raw string so an unknown value becomes a
/// collected error instead of a deserialization failure. Unknown fields are
/// rejected at the serde boundary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TradeDraft {
    pub instrument: Option<String>,
    pub qty: Option<f64>,
    pub avg: Option<f64>,
    pub ltp: Option<f64>,
    pub status: Option<String>,
    pub sell_price: Option<f64>,
}

/// Validate a single trade payload. Returns every failed rule in order;
/// an empty list means the payload may be written.
pub fn validate_trade(draft: &TradeDraft) -> Vec<String> {
    let mut errors = Vec::new();

    let required: [(&str, bool); 5] = [
        ("instrument", draft.instrument.is_some()),
        ("qty", draft.qty.is_some()),
        ("avg", draft.avg.is_some()),
        ("ltp", draft.ltp.is_some()),
        ("status", draft.status.is_some()),
    ];
    for (field, present) in required {
        if !present {
            errors.push(format!("{field} is required"));
        }
    }

    let status = draft.status.as_deref();
    if status == Some("closed") && draft.sell_price.is_none() {
        errors.push("sellPrice is required for closed positions".to_string());
    }
    if status == Some("open") && draft.sell_price.is_some() {
        errors.push("sellPrice must be null for open positions".to_string());
    }
    if let Some(value) = status {
        if TradeStatus::parse(value).is_none() {
            errors.push("status must be either \"open\" or \"closed\"".to_string());
        }
    }

    errors
}

/// Validate a batch of trade payloads, aggregating per-trade failures with
/// the trade's position in the batch.
pub fn validate_trades(drafts: &[TradeDraft]) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, draft) in drafts.iter().enumerate() {
        let trade_errors = validate_trade(draft);
        if !trade_errors.is_empty() {
            errors.push(format!("Trade {index}: {}", trade_errors.join(", ")));
        }
    }
    errors
}
