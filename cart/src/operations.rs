use crate::chaos::ChaosGuard;
use crate::domain::{Cart, LineItemDraft};
use crate::latency::SimulatedLatency;
use crate::ports::{FlagSource, RecordStore};
use crate::{CART_TTL, cart_key};
use chrono::Utc;
use shared::{Error, Result, TtlMs};
use std::sync::Arc;
use tracing::{debug, info};

const ADD_ITEM_ENDPOINT: &str = "add_item";

/// Application service for every cart operation.
///
/// Each mutation is a plain read-modify-write of the whole record: read the
/// snapshot, change it in memory, write it back with a fresh TTL. There is no
/// locking or version check, so two concurrent writers to the same cart race
/// and the last write wins.
#[derive(Clone)]
pub struct CartOperationsService {
    store: Arc<dyn RecordStore>,
    chaos: ChaosGuard,
    latency: SimulatedLatency,
    ttl: TtlMs,
}

impl CartOperationsService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        flags: Arc<dyn FlagSource>,
        latency: SimulatedLatency,
    ) -> Self {
        Self {
            store,
            chaos: ChaosGuard::new(flags),
            latency,
            ttl: CART_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: TtlMs) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn create_cart(&self) -> Result<Cart> {
        let cart = Cart::new(Cart::generate_id(), Utc::now());
        self.save(&cart).await?;

        info!("Cart created: {}", cart.id);
        Ok(cart)
    }

    /// Read-only: does not refresh the TTL.
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart> {
        self.latency.fetch.pause().await;
        self.load(cart_id).await
    }

    /// Chaos gate for Add Item; runs before the request body is looked at.
    pub async fn check_add_item_chaos(&self, cart_id: &str) -> Result<()> {
        self.chaos.check(cart_id, ADD_ITEM_ENDPOINT).await
    }

    pub async fn add_item(&self, cart_id: &str, draft: LineItemDraft) -> Result<Cart> {
        self.check_add_item_chaos(cart_id).await?;

        let item = draft.validate()?;
        self.latency.add_item.pause().await;

        let mut cart = self.load(cart_id).await?;
        let (item_id, quantity) = (item.item_id.clone(), item.quantity);
        cart.add_item(item, Utc::now());
        self.save(&cart).await?;

        info!("Added {}x {} to cart {}", quantity, item_id, cart_id);
        Ok(cart)
    }

    /// Replaces the quantity; zero or negative removes the item.
    pub async fn update_item_quantity(
        &self,
        cart_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> Result<Cart> {
        let mut cart = self.load(cart_id).await?;
        cart.set_item_quantity(item_id, quantity, Utc::now())?;
        self.save(&cart).await?;

        info!("Updated {} quantity to {} in cart {}", item_id, quantity, cart_id);
        Ok(cart)
    }

    pub async fn remove_item(&self, cart_id: &str, item_id: &str) -> Result<Cart> {
        let mut cart = self.load(cart_id).await?;
        cart.remove_item(item_id, Utc::now());
        self.save(&cart).await?;

        info!("Removed {} from cart {}", item_id, cart_id);
        Ok(cart)
    }

    pub async fn clear_cart(&self, cart_id: &str) -> Result<()> {
        let deleted = self.store.delete(&cart_key(cart_id)).await?;
        if deleted == 0 {
            return Err(Error::CartNotFound);
        }

        info!("Cart cleared: {}", cart_id);
        Ok(())
    }

    pub async fn ping_store(&self) -> Result<()> {
        self.store.ping().await
    }

    /// Helper method to fetch and decode a cart record
    async fn load(&self, cart_id: &str) -> Result<Cart> {
        let raw = self
            .store
            .get(&cart_key(cart_id))
            .await?
            .ok_or(Error::CartNotFound)?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let raw = serde_json::to_string(cart)?;
        debug!("Writing cart {} ({} bytes, ttl {}ms)", cart.id, raw.len(), self.ttl.0);
        self.store.put(&cart_key(&cart.id), raw, self.ttl).await
    }
}

impl std::fmt::Debug for CartOperationsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartOperationsService")
            .field("chaos", &self.chaos)
            .field("latency", &self.latency)
            .field("ttl", &self.ttl)
            .finish()
    }
}
