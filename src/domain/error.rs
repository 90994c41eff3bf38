//! Domain error types.

/// Top-level error type for tradebuckets.
#[derive(Debug, thiserror::Error)]
pub enum TradebucketsError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("validation failed: {}", .errors.join(", "))]
    Validation { errors: Vec<String> },

    #[error("derivation failed: {reason}")]
    Derivation { reason: String },

    #[error("bucket not found: {id}")]
    BucketNotFound { id: String },

    #[error("trade {trade_id} not found in bucket {bucket_id}")]
    TradeNotFound {
        bucket_id: String,
        trade_id: String,
    },

    #[error("bucket name already exists: {name}")]
    DuplicateName { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradebucketsError> for std::process::ExitCode {
    fn from(err: &TradebucketsError) -> Self {
        let code: u8 = match err {
            TradebucketsError::Io(_) => 1,
            TradebucketsError::ConfigParse { .. }
            | TradebucketsError::ConfigMissing { .. }
            | TradebucketsError::ConfigInvalid { .. } => 2,
            TradebucketsError::Database { .. } | TradebucketsError::DatabaseQuery { .. } => 3,
            TradebucketsError::Validation { .. }
            | TradebucketsError::Derivation { .. }
            | TradebucketsError::DuplicateName { .. } => 4,
            TradebucketsError::BucketNotFound { .. } | TradebucketsError::TradeNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
