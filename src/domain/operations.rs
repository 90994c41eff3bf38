//! Bucket write and read operations.
//!
//! These are the operations the HTTP adapter exposes. Each one validates,
//! derives profit/loss at both the trade and bucket level, and then talks to
//! the store through [`BucketStorePort`], so the same logic runs unchanged
//! against SQLite in production and a mock store in tests.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::bucket::Bucket;
use super::error::TradebucketsError;
use super::trade::{Trade, TradeStatus};
use super::validation::{TradeDraft, validate_trade, validate_trades};
use crate::ports::bucket_store_port::BucketStorePort;

/// Create a bucket with an optional initial set of trades.
///
/// Every draft is validated up front and failures are aggregated per trade,
/// so a batch submission reports all of its problems in one response. The
/// store maps a name collision to [`TradebucketsError::DuplicateName`] and
/// writes nothing.
pub fn create_bucket(
    store: &dyn BucketStorePort,
    name: &str,
    drafts: &[TradeDraft],
) -> Result<Bucket, TradebucketsError> {
    if name.trim().is_empty() {
        return Err(TradebucketsError::Validation {
            errors: vec!["Bucket name is required".to_string()],
        });
    }

    let errors = validate_trades(drafts);
    if !errors.is_empty() {
        return Err(TradebucketsError::Validation { errors });
    }

    let now = Utc::now();
    let trades = drafts
        .iter()
        .map(|draft| materialize_trade(draft, now))
        .collect::<Result<Vec<_>, _>>()?;

    let mut bucket = Bucket::new(Uuid::new_v4().to_string(), name.to_string(), trades, now);
    bucket.recompute()?;
    store.insert_bucket(&bucket)?;
    Ok(bucket)
}

/// Append a trade to an existing bucket and re-derive both levels.
pub fn add_trade(
    store: &dyn BucketStorePort,
    bucket_id: &str,
    draft: &TradeDraft,
) -> Result<Bucket, TradebucketsError> {
    let errors = validate_trade(draft);
    if !errors.is_empty() {
        return Err(TradebucketsError::Validation { errors });
    }

    let mut bucket = store
        .fetch_bucket(bucket_id)?
        .ok_or_else(|| TradebucketsError::BucketNotFound {
            id: bucket_id.to_string(),
        })?;

    let now = Utc::now();
    bucket.trades.push(materialize_trade(draft, now)?);
    bucket.updated_at = now;
    bucket.recompute()?;
    store.replace_bucket(&bucket)?;
    Ok(bucket)
}

/// Replace every editable field of an existing trade.
///
/// When the submitted status is "open" the sell price is discarded before
/// validation, whatever the payload carried; the edit form always submits
/// the field.
pub fn update_trade(
    store: &dyn BucketStorePort,
    bucket_id: &str,
    trade_id: &str,
    draft: &TradeDraft,
) -> Result<Bucket, TradebucketsError> {
    let mut bucket = store
        .fetch_bucket(bucket_id)?
        .ok_or_else(|| TradebucketsError::BucketNotFound {
            id: bucket_id.to_string(),
        })?;

    let now = Utc::now();
    let mut replacement = draft.clone();
    if replacement.status.as_deref() == Some("open") {
        replacement.sell_price = None;
    }

    let errors = validate_trade(&replacement);
    if !errors.is_empty() {
        return Err(TradebucketsError::Validation { errors });
    }

    let trade = bucket
        .trade_mut(trade_id)
        .ok_or_else(|| TradebucketsError::TradeNotFound {
            bucket_id: bucket_id.to_string(),
            trade_id: trade_id.to_string(),
        })?;

    trade.instrument = replacement.instrument.ok_or_else(|| missing("instrument"))?;
    trade.qty = replacement.qty.ok_or_else(|| missing("qty"))?;
    trade.avg = replacement.avg.ok_or_else(|| missing("avg"))?;
    trade.ltp = replacement.ltp.ok_or_else(|| missing("ltp"))?;
    trade.status = parse_status(replacement.status.as_deref())?;
    trade.sell_price = replacement.sell_price;
    trade.updated_at = now;

    bucket.updated_at = now;
    bucket.recompute()?;
    store.replace_bucket(&bucket)?;
    Ok(bucket)
}

/// All buckets with their current derived fields. An empty store yields an
/// empty list, not an error.
pub fn list_buckets(store: &dyn BucketStorePort) -> Result<Vec<Bucket>, TradebucketsError> {
    store.list_buckets()
}

/// A single bucket by id.
pub fn get_bucket(
    store: &dyn BucketStorePort,
    bucket_id: &str,
) -> Result<Bucket, TradebucketsError> {
    store
        .fetch_bucket(bucket_id)?
        .ok_or_else(|| TradebucketsError::BucketNotFound {
            id: bucket_id.to_string(),
        })
}

/// Turn a validated draft into a persisted-shape trade with a fresh id.
/// The presence checks mirror validation as a second line of defense.
fn materialize_trade(
    draft: &TradeDraft,
    now: DateTime<Utc>,
) -> Result<Trade, TradebucketsError> {
    Ok(Trade {
        id: Uuid::new_v4().to_string(),
        instrument: draft.instrument.clone().ok_or_else(|| missing("instrument"))?,
        qty: draft.qty.ok_or_else(|| missing("qty"))?,
        avg: draft.avg.ok_or_else(|| missing("avg"))?,
        ltp: draft.ltp.ok_or_else(|| missing("ltp"))?,
        status: parse_status(draft.status.as_deref())?,
        sell_price: draft.sell_price,
        profit_and_loss: 0.0,
        created_at: now,
        updated_at: now,
    })
}

fn parse_status(raw: Option<&str>) -> Result<TradeStatus, TradebucketsError> {
    let value = raw.ok_or_else(|| missing("status"))?;
    TradeStatus::parse(value).ok_or_else(|| TradebucketsError::Validation {
        errors: vec!["status must be either \"open\" or \"closed\"".to_string()],
    })
}

fn missing(field: &str) -> TradebucketsError {
    TradebucketsError::Validation {
        errors: vec![format!("{field} is required")],
    }
}
