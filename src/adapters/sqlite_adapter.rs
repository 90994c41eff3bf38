//! SQLite bucket store adapter.
//!
//! Buckets and their embedded trades persist across two tables; a bucket
//! write always replaces the bucket row and every trade row in a single
//! transaction, which keeps the document-per-save semantics of the port.

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::domain::bucket::Bucket;
use crate::domain::error::TradebucketsError;
use crate::domain::trade::{Trade, TradeStatus};
use crate::ports::bucket_store_port::BucketStorePort;
use crate::ports::config_port::ConfigPort;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradebucketsError> {
        let db_path =
            config
                .get_string("database", "sqlite_path")
                .ok_or_else(|| TradebucketsError::ConfigMissing {
                    section: "database".into(),
                    key: "sqlite_path".into(),
                })?;

        let pool_size = config.get_int("database", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| TradebucketsError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TradebucketsError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TradebucketsError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TradebucketsError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradebucketsError::Database {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS buckets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                total_profit_and_loss REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                bucket_id TEXT NOT NULL REFERENCES buckets(id),
                seq INTEGER NOT NULL,
                instrument TEXT NOT NULL,
                qty REAL NOT NULL,
                avg REAL NOT NULL,
                ltp REAL NOT NULL,
                status TEXT NOT NULL,
                sell_price REAL,
                profit_and_loss REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_bucket ON trades(bucket_id, seq);",
        )
        .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn fetch_trades(
        conn: &rusqlite::Connection,
        bucket_id: &str,
    ) -> Result<Vec<Trade>, TradebucketsError> {
        let query = "SELECT id, instrument, qty, avg, ltp, status, sell_price,
                            profit_and_loss, created_at, updated_at
                     FROM trades
                     WHERE bucket_id = ?1
                     ORDER BY seq ASC";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map(params![bucket_id], |row| {
                let status_str: String = row.get(5)?;
                let status = TradeStatus::parse(&status_str).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        format!("unknown trade status: {status_str}").into(),
                    )
                })?;
                Ok(Trade {
                    id: row.get(0)?,
                    instrument: row.get(1)?,
                    qty: row.get(2)?,
                    avg: row.get(3)?,
                    ltp: row.get(4)?,
                    status,
                    sell_price: row.get(6)?,
                    profit_and_loss: row.get(7)?,
                    created_at: parse_timestamp(row.get::<_, String>(8)?, 8)?,
                    updated_at: parse_timestamp(row.get::<_, String>(9)?, 9)?,
                })
            })
            .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(row.map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            })?);
        }

        Ok(trades)
    }

    fn insert_trades(
        tx: &rusqlite::Transaction<'_>,
        bucket: &Bucket,
    ) -> Result<(), rusqlite::Error> {
        for (seq, trade) in bucket.trades.iter().enumerate() {
            tx.execute(
                "INSERT INTO trades (id, bucket_id, seq, instrument, qty, avg, ltp,
                                     status, sell_price, profit_and_loss, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    trade.id,
                    bucket.id,
                    seq as i64,
                    trade.instrument,
                    trade.qty,
                    trade.avg,
                    trade.ltp,
                    trade.status.as_str(),
                    trade.sell_price,
                    trade.profit_and_loss,
                    trade.created_at.to_rfc3339(),
                    trade.updated_at.to_rfc3339(),
                ],
            )?;
        }
        Ok(())
    }
}

fn parse_timestamp(value: String, column: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// The only UNIQUE constraint reachable from a bucket write with a fresh id
/// is the name index, so a constraint violation means a taken name.
fn map_bucket_write_error(err: rusqlite::Error, name: &str) -> TradebucketsError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            return TradebucketsError::DuplicateName {
                name: name.to_string(),
            };
        }
    }
    TradebucketsError::DatabaseQuery {
        reason: err.to_string(),
    }
}

impl BucketStorePort for SqliteAdapter {
    fn insert_bucket(&self, bucket: &Bucket) -> Result<(), TradebucketsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradebucketsError::Database {
                reason: e.to_string(),
            })?;

        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        tx.execute(
            "INSERT INTO buckets (id, name, total_profit_and_loss, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                bucket.id,
                bucket.name,
                bucket.total_profit_and_loss,
                bucket.created_at.to_rfc3339(),
                bucket.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| map_bucket_write_error(e, &bucket.name))?;

        Self::insert_trades(&tx, bucket).map_err(|e: rusqlite::Error| {
            TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            }
        })?;

        tx.commit()
            .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn fetch_bucket(&self, id: &str) -> Result<Option<Bucket>, TradebucketsError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradebucketsError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT id, name, total_profit_and_loss, created_at, updated_at
                     FROM buckets WHERE id = ?1";

        let row = conn
            .query_row(query, params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    parse_timestamp(row.get::<_, String>(3)?, 3)?,
                    parse_timestamp(row.get::<_, String>(4)?, 4)?,
                ))
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(TradebucketsError::DatabaseQuery {
                    reason: other.to_string(),
                }),
            })?;

        let Some((bucket_id, name, total, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let trades = Self::fetch_trades(&conn, &bucket_id)?;

        Ok(Some(Bucket {
            id: bucket_id,
            name,
            trades,
            total_profit_and_loss: total,
            created_at,
            updated_at,
        }))
    }

    fn list_buckets(&self) -> Result<Vec<Bucket>, TradebucketsError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradebucketsError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT id, name, total_profit_and_loss, created_at, updated_at
                     FROM buckets ORDER BY rowid ASC";

        let mut stmt =
            conn.prepare(query)
                .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    parse_timestamp(row.get::<_, String>(3)?, 3)?,
                    parse_timestamp(row.get::<_, String>(4)?, 4)?,
                ))
            })
            .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut headers = Vec::new();
        for row in rows {
            headers.push(row.map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            })?);
        }

        let mut buckets = Vec::with_capacity(headers.len());
        for (id, name, total, created_at, updated_at) in headers {
            let trades = Self::fetch_trades(&conn, &id)?;
            buckets.push(Bucket {
                id,
                name,
                trades,
                total_profit_and_loss: total,
                created_at,
                updated_at,
            });
        }

        Ok(buckets)
    }

    fn replace_bucket(&self, bucket: &Bucket) -> Result<(), TradebucketsError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradebucketsError::Database {
                reason: e.to_string(),
            })?;

        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let changed = tx
            .execute(
                "UPDATE buckets SET name = ?2, total_profit_and_loss = ?3, updated_at = ?4
                 WHERE id = ?1",
                params![
                    bucket.id,
                    bucket.name,
                    bucket.total_profit_and_loss,
                    bucket.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| map_bucket_write_error(e, &bucket.name))?;

        if changed == 0 {
            return Err(TradebucketsError::BucketNotFound {
                id: bucket.id.clone(),
            });
        }

        tx.execute("DELETE FROM trades WHERE bucket_id = ?1", params![bucket.id])
            .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Self::insert_trades(&tx, bucket).map_err(|e: rusqlite::Error| {
            TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            }
        })?;

        tx.commit()
            .map_err(|e: rusqlite::Error| TradebucketsError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
