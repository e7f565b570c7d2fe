use async_trait::async_trait;
use cart::ports::RecordStore;
use moka::Expiry;
use moka::future::Cache;
use shared::{Result, TtlMs};
use std::fmt::Debug;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct StoredRecord {
    value: String,
    ttl: Duration,
}

/// Expires each record after the TTL it was last written with
struct RecordExpiry;

impl Expiry<String, StoredRecord> for RecordExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredRecord,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredRecord,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-process record store with per-entry TTL
/// Used for local runs without a Redis instance and in tests
pub struct MokaRecordStore {
    cache: Cache<String, StoredRecord>,
}

impl MokaRecordStore {
    /// Create an unbounded store
    pub fn new_unbounded() -> Self {
        Self {
            cache: Cache::builder()
                .name("carts")
                .expire_after(RecordExpiry)
                .build(),
        }
    }

    /// Create a store holding at most `max_entries` records
    pub fn new_bounded(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder()
                .name("carts")
                .max_capacity(max_entries)
                .expire_after(RecordExpiry)
                .build(),
        }
    }
}

impl Default for MokaRecordStore {
    fn default() -> Self {
        Self::new_unbounded()
    }
}

#[async_trait]
impl RecordStore for MokaRecordStore {
    async fn put(&self, key: &str, value: String, ttl: TtlMs) -> Result<()> {
        let record = StoredRecord {
            value,
            ttl: ttl.as_duration(),
        };
        self.cache.insert(key.to_string(), record).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        // Expired entries are never returned
        Ok(self.cache.get(key).await.map(|record| record.value))
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        // `remove` can hand back an expired entry that has not been evicted
        // yet, so only a live read counts as a deletion
        let live = self.cache.get(key).await.is_some();
        self.cache.invalidate(key).await;
        Ok(u64::from(live))
    }
}

impl Debug for MokaRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaRecordStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
