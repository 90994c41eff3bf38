#![allow(dead_code)]

use std::sync::Mutex;

use tradebuckets::domain::bucket::Bucket;
use tradebuckets::domain::error::TradebucketsError;
use tradebuckets::domain::validation::TradeDraft;
use tradebuckets::ports::bucket_store_port::BucketStorePort;
use tradebuckets::ports::config_port::ConfigPort;

/// In-memory bucket store preserving insertion order, with an optional
/// injected failure for exercising error paths.
pub struct MockBucketStore {
    buckets: Mutex<Vec<Bucket>>,
    fail_with: Option<String>,
}

impl MockBucketStore {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            buckets: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().unwrap().len()
    }

    fn check_failure(&self) -> Result<(), TradebucketsError> {
        match &self.fail_with {
            Some(reason) => Err(TradebucketsError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl BucketStorePort for MockBucketStore {
    fn insert_bucket(&self, bucket: &Bucket) -> Result<(), TradebucketsError> {
        self.check_failure()?;
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.iter().any(|b| b.name == bucket.name) {
            return Err(TradebucketsError::DuplicateName {
                name: bucket.name.clone(),
            });
        }
        buckets.push(bucket.clone());
        Ok(())
    }

    fn fetch_bucket(&self, id: &str) -> Result<Option<Bucket>, TradebucketsError> {
        self.check_failure()?;
        let buckets = self.buckets.lock().unwrap();
        Ok(buckets.iter().find(|b| b.id == id).cloned())
    }

    fn list_buckets(&self) -> Result<Vec<Bucket>, TradebucketsError> {
        self.check_failure()?;
        Ok(self.buckets.lock().unwrap().clone())
    }

    fn replace_bucket(&self, bucket: &Bucket) -> Result<(), TradebucketsError> {
        self.check_failure()?;
        let mut buckets = self.buckets.lock().unwrap();
        match buckets.iter_mut().find(|b| b.id == bucket.id) {
            Some(slot) => {
                *slot = bucket.clone();
                Ok(())
            }
            None => Err(TradebucketsError::BucketNotFound {
                id: bucket.id.clone(),
            }),
        }
    }
}

/// Config port backed by a fixed list of string keys, for adapter and
/// router construction in tests.
pub struct MockConfigPort {
    pub entries: Vec<((&'static str, &'static str), String)>,
}

impl MockConfigPort {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, section: &'static str, key: &'static str, value: &str) -> Self {
        self.entries.push(((section, key), value.to_string()));
        self
    }
}

impl ConfigPort for MockConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|((s, k), _)| *s == section && *k == key)
            .map(|(_, v)| v.clone())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get_string(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

pub fn open_draft(instrument: &str, qty: f64, avg: f64, ltp: f64) -> TradeDraft {
    TradeDraft {
        instrument: Some(instrument.to_string()),
        qty: Some(qty),
        avg: Some(avg),
        ltp: Some(ltp),
        status: Some("open".to_string()),
        sell_price: None,
    }
}

pub fn closed_draft(instrument: &str, qty: f64, avg: f64, ltp: f64, sell_price: f64) -> TradeDraft {
    TradeDraft {
        instrument: Some(instrument.to_string()),
        qty: Some(qty),
        avg: Some(avg),
        ltp: Some(ltp),
        status: Some("closed".to_string()),
        sell_price: Some(sell_price),
    }
}
