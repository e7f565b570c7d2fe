use crate::state::AppState;
use async_trait::async_trait;
use axum::response::Response;
use cart::{FlagEvaluation, FlagSource, NoopFlagSource, RecordStore, SimulatedLatency};
use serde_json::Value;
use shared::{Error, Result, TtlMs};
use std::sync::Arc;
use storage_engine::MokaRecordStore;

/// Flag source answering every evaluation with the same value.
struct FixedFlag(Value);

#[async_trait]
impl FlagSource for FixedFlag {
    async fn resolve_object(&self, _evaluation: FlagEvaluation) -> Result<Option<Value>> {
        Ok(Some(self.0.clone()))
    }
}

struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn put(&self, _key: &str, _value: String, _ttl: TtlMs) -> Result<()> {
        Err(Error::Storage("store unavailable".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Storage("store unavailable".into()))
    }

    async fn delete(&self, _key: &str) -> Result<u64> {
        Err(Error::Storage("store unavailable".into()))
    }
}

struct PanickingStore;

#[async_trait]
impl RecordStore for PanickingStore {
    async fn put(&self, _key: &str, _value: String, _ttl: TtlMs) -> Result<()> {
        panic!("store exploded")
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        panic!("store exploded")
    }

    async fn delete(&self, _key: &str) -> Result<u64> {
        panic!("store exploded")
    }
}

pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(MokaRecordStore::new_unbounded()),
        Arc::new(NoopFlagSource),
        SimulatedLatency::disabled(),
    )
}

pub fn chaos_state(flag_value: Value) -> AppState {
    AppState::new(
        Arc::new(MokaRecordStore::new_unbounded()),
        Arc::new(FixedFlag(flag_value)),
        SimulatedLatency::disabled(),
    )
}

pub fn failing_state() -> AppState {
    AppState::new(
        Arc::new(UnavailableStore),
        Arc::new(NoopFlagSource),
        SimulatedLatency::disabled(),
    )
}

pub fn panicking_state() -> AppState {
    AppState::new(
        Arc::new(PanickingStore),
        Arc::new(NoopFlagSource),
        SimulatedLatency::disabled(),
    )
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
