use cart::{CartOperationsService, FlagSource, NoopFlagSource, RecordStore, SimulatedLatency};
use feature_flags::FlagdClient;
use shared::config::{Config, StoreBackend};
use std::sync::Arc;
use std::time::Duration;
use storage_engine::{MokaRecordStore, RedisRecordStore};
use tracing::{info, warn};

/// Upper bound on a single flag evaluation so chaos checks never stall a request.
const FLAG_EVALUATION_TIMEOUT: Duration = Duration::from_millis(500);

/// Server state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub cart_operations: Arc<CartOperationsService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        flags: Arc<dyn FlagSource>,
        latency: SimulatedLatency,
    ) -> Self {
        Self {
            cart_operations: Arc::new(CartOperationsService::new(store, flags, latency)),
        }
    }

    /// Wires the configured store, flag source and latency profile.
    pub fn from_config(config: &Config) -> shared::Result<Self> {
        let store: Arc<dyn RecordStore> = match &config.store {
            StoreBackend::Redis(url) => {
                info!("🔗 Redis: {}", url);
                Arc::new(RedisRecordStore::open(url)?)
            }
            StoreBackend::Memory => {
                warn!("Using in-memory cart store; carts are lost on restart");
                Arc::new(MokaRecordStore::new_unbounded())
            }
        };

        let flags: Arc<dyn FlagSource> = match &config.flagd {
            Some(endpoint) => match FlagdClient::new(endpoint.base_url(), FLAG_EVALUATION_TIMEOUT) {
                Ok(client) => {
                    info!("OpenFeature flags resolved via flagd at {}", endpoint.base_url());
                    Arc::new(client)
                }
                Err(e) => {
                    warn!("⚠️  Could not create flagd client: {}. Feature flags disabled.", e);
                    Arc::new(NoopFlagSource)
                }
            },
            None => {
                info!("Feature flags disabled");
                Arc::new(NoopFlagSource)
            }
        };

        let latency = if config.simulate_latency {
            SimulatedLatency::realistic()
        } else {
            SimulatedLatency::disabled()
        };

        Ok(Self::new(store, flags, latency))
    }
}
