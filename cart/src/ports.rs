use async_trait::async_trait;
use serde_json::Value;
use shared::{Result, TtlMs};
use std::collections::BTreeMap;

// Ports are the pluggable extension points for the record store and the flag source

/// Port for the key-value store holding serialized cart records
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Write the full value, replacing any previous one and resetting its TTL
    async fn put(&self, key: &str, value: String, ttl: TtlMs) -> Result<()>;

    /// Read a value; `None` when the key never existed or has expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete a key, returning how many records were removed
    async fn delete(&self, key: &str) -> Result<u64>;

    /// Connectivity check
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// A single object-flag evaluation request.
#[derive(Clone, Debug, PartialEq)]
pub struct FlagEvaluation {
    pub flag_key: String,
    pub targeting_key: String,
    pub attributes: BTreeMap<String, String>,
}

impl FlagEvaluation {
    pub fn new(flag_key: impl Into<String>, targeting_key: impl Into<String>) -> Self {
        Self {
            flag_key: flag_key.into(),
            targeting_key: targeting_key.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Port for the remote feature-flag decision source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlagSource: Send + Sync + 'static {
    /// Resolve an object-valued flag; `Ok(None)` means no decision (use the default)
    async fn resolve_object(&self, evaluation: FlagEvaluation) -> Result<Option<Value>>;
}

/// Flag source used when no flag service is configured: never decides anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopFlagSource;

#[async_trait]
impl FlagSource for NoopFlagSource {
    async fn resolve_object(&self, _evaluation: FlagEvaluation) -> Result<Option<Value>> {
        Ok(None)
    }
}
