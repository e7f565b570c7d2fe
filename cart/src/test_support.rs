use crate::ports::RecordStore;
use async_trait::async_trait;
use shared::{Error, Result, TtlMs};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// HashMap-backed store that records TTLs and counts calls. No expiry.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, (String, TtlMs)>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn ttl_of(&self, key: &str) -> Option<TtlMs> {
        self.records
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, ttl)| *ttl)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put(&self, key: &str, value: String, ttl: TtlMs) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(key)
            .map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        Ok(self.records.lock().unwrap().remove(key).map_or(0, |_| 1))
    }
}

/// Store whose every call fails, standing in for an unreachable backend.
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn put(&self, _key: &str, _value: String, _ttl: TtlMs) -> Result<()> {
        Err(Error::Storage("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Storage("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<u64> {
        Err(Error::Storage("connection refused".to_string()))
    }
}
