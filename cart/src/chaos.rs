use crate::ports::{FlagEvaluation, FlagSource};
use serde::Deserialize;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const CHAOS_FLAG_KEY: &str = "cart-chaos-errors";

/// Decoded value of the chaos flag. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChaosConfig {
    pub enabled: bool,
    /// Percentage (0-100) of requests to fail
    pub error_rate: f64,
    pub delay_ms: u64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            error_rate: 0.0,
            delay_ms: 1000,
        }
    }
}

impl ChaosConfig {
    /// `draw` is a uniform sample in `[0, 100)`.
    pub fn trips(&self, draw: f64) -> bool {
        self.enabled && draw < self.error_rate
    }
}

/// Flag-controlled fault injection. Fails open on any flag source problem.
#[derive(Clone)]
pub struct ChaosGuard {
    source: Arc<dyn FlagSource>,
}

impl ChaosGuard {
    pub fn new(source: Arc<dyn FlagSource>) -> Self {
        Self { source }
    }

    /// Returns `ChaosInjected` after sleeping `delayMs` when the flag trips.
    pub async fn check(&self, cart_id: &str, endpoint: &str) -> Result<()> {
        let config = self.evaluate(cart_id, endpoint).await;
        if !config.enabled {
            return Ok(());
        }

        let draw = rand::random::<f64>() * 100.0;
        if !config.trips(draw) {
            debug!(
                "Chaos flag enabled but not triggered for cart {} (draw {:.2} >= {}%)",
                cart_id, draw, config.error_rate
            );
            return Ok(());
        }

        warn!(
            "Feature flag triggered chaos on {} for cart {}: {}% error rate, {}ms delay",
            endpoint, cart_id, config.error_rate, config.delay_ms
        );
        tokio::time::sleep(Duration::from_millis(config.delay_ms)).await;

        Err(Error::ChaosInjected {
            retry_after_ms: config.delay_ms,
        })
    }

    async fn evaluate(&self, cart_id: &str, endpoint: &str) -> ChaosConfig {
        let evaluation =
            FlagEvaluation::new(CHAOS_FLAG_KEY, cart_id).with_attribute("endpoint", endpoint);

        match self.source.resolve_object(evaluation).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Ignoring malformed {} flag value: {}", CHAOS_FLAG_KEY, e);
                ChaosConfig::default()
            }),
            Ok(None) => ChaosConfig::default(),
            Err(e) => {
                warn!("Flag evaluation failed, chaos disabled for this request: {}", e);
                ChaosConfig::default()
            }
        }
    }
}

impl std::fmt::Debug for ChaosGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaosGuard")
            .field("flag", &CHAOS_FLAG_KEY)
            .finish()
    }
}
