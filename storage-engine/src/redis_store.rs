use async_trait::async_trait;
use cart::ports::RecordStore;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use shared::{Error, Result, TtlMs};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

/// Bound on a single connect attempt and on each command round trip.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
const CONNECT_RETRIES: usize = 1;
/// Hard cap on establishing the first connection, retries included.
const CONNECT_BUDGET: Duration = Duration::from_secs(5);

fn storage_error(err: redis::RedisError) -> Error {
    Error::Storage(err.to_string())
}

/// Redis-backed record store.
///
/// The connection is opened lazily on first use and shared afterwards; the
/// connection manager reconnects on its own after transient failures. An
/// unreachable server fails the call within `CONNECT_BUDGET`. Values
/// are written with `PSETEX`, so every write replaces the whole record and
/// resets its expiry.
pub struct RedisRecordStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisRecordStore {
    /// Parses the url without connecting.
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(storage_error)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_connection_timeout(CONNECT_TIMEOUT)
                    .set_response_timeout(RESPONSE_TIMEOUT)
                    .set_number_of_retries(CONNECT_RETRIES);
                let manager = tokio::time::timeout(
                    CONNECT_BUDGET,
                    self.client.get_connection_manager_with_config(config),
                )
                .await
                .map_err(|_| {
                    Error::Storage(format!(
                        "timed out connecting to Redis after {}s",
                        CONNECT_BUDGET.as_secs()
                    ))
                })?
                .map_err(storage_error)?;
                info!("Connected to Redis at {}", self.client.get_connection_info().addr);
                Ok::<_, Error>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn put(&self, key: &str, value: String, ttl: TtlMs) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.pset_ex::<_, _, ()>(key, value, ttl.0)
            .await
            .map_err(storage_error)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(storage_error)
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.connection().await?;
        conn.del::<_, u64>(key).await.map_err(storage_error)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRecordStore")
            .field("addr", &self.client.get_connection_info().addr.to_string())
            .field("connected", &self.connection.initialized())
            .finish()
    }
}
