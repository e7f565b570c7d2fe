pub mod chaos;
pub mod domain;
pub mod latency;
pub mod operations;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use chaos::{ChaosConfig, ChaosGuard};
pub use domain::{Cart, LineItem, LineItemDraft, NewLineItem};
pub use latency::{LatencyWindow, SimulatedLatency};
pub use operations::CartOperationsService;
pub use ports::{FlagEvaluation, FlagSource, NoopFlagSource, RecordStore};

use shared::TtlMs;

/// Every write refreshes the record to this TTL.
pub const CART_TTL: TtlMs = TtlMs::from_secs(3600);

/// Store key for a cart id.
pub fn cart_key(cart_id: &str) -> String {
    format!("cart:{cart_id}")
}
