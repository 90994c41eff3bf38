//! Bucket persistence port trait.

use crate::domain::bucket::Bucket;
use crate::domain::error::TradebucketsError;

/// Document-style bucket storage: each bucket persists as one unit together
/// with its embedded trades, keyed by its generated id, with bucket names
/// unique store-wide.
pub trait BucketStorePort {
    /// Insert a new bucket. Fails with `DuplicateName` when the name is
    /// already taken, in which case nothing is written.
    fn insert_bucket(&self, bucket: &Bucket) -> Result<(), TradebucketsError>;

    fn fetch_bucket(&self, id: &str) -> Result<Option<Bucket>, TradebucketsError>;

    fn list_buckets(&self) -> Result<Vec<Bucket>, TradebucketsError>;

    /// Overwrite an existing bucket and its embedded trades in one save.
    /// Concurrent saves of the same bucket are last-write-wins.
    fn replace_bucket(&self, bucket: &Bucket) -> Result<(), TradebucketsError>;
}
