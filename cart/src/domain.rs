use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use uuid::Uuid;

/// A shopping cart as stored in the record store and returned over HTTP.
///
/// Carts are always persisted as a complete snapshot; mutations happen on an
/// in-memory copy that is written back whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_id: String,
    pub item_name: Option<String>,
    pub item_emoji: Option<String>,
    pub quantity: u32,
    pub base_price: f64,
    pub added_at: DateTime<Utc>,
}

/// A validated item ready to be added to a cart.
#[derive(Clone, Debug, PartialEq)]
pub struct NewLineItem {
    pub item_id: String,
    pub item_name: Option<String>,
    pub item_emoji: Option<String>,
    pub quantity: u32,
    pub base_price: f64,
}

/// Unvalidated add-item input as received from a caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineItemDraft {
    pub item_id: Option<String>,
    pub item_name: Option<String>,
    pub item_emoji: Option<String>,
    pub quantity: Option<i64>,
    pub base_price: Option<f64>,
}

impl LineItemDraft {
    pub fn validate(self) -> Result<NewLineItem> {
        let item_id = self.item_id.filter(|id| !id.trim().is_empty());
        let (Some(item_id), Some(quantity)) = (item_id, self.quantity.filter(|q| *q != 0)) else {
            return Err(Error::BadRequest(
                "itemId and quantity are required".to_string(),
            ));
        };

        if quantity < 0 {
            return Err(Error::BadRequest(
                "quantity must be a positive integer".to_string(),
            ));
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| Error::BadRequest("quantity is too large".to_string()))?;

        let base_price = self.base_price.unwrap_or(0.0);
        if base_price < 0.0 || !base_price.is_finite() {
            return Err(Error::BadRequest(
                "basePrice must be a non-negative number".to_string(),
            ));
        }

        Ok(NewLineItem {
            item_id,
            item_name: self.item_name,
            item_emoji: self.item_emoji,
            quantity,
            base_price,
        })
    }
}

impl Cart {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Short id: the first group of a v4 UUID (8 lowercase hex chars).
    pub fn generate_id() -> String {
        format!("{:08x}", Uuid::new_v4().as_fields().0)
    }

    pub fn item(&self, item_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    /// Adds an item, merging into an existing line by summing quantities.
    ///
    /// A merge keeps the existing line's metadata and `addedAt`; the incoming
    /// name, emoji and price are dropped.
    pub fn add_item(&mut self, item: NewLineItem, now: DateTime<Utc>) {
        match self.items.iter_mut().find(|line| line.item_id == item.item_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => self.items.push(LineItem {
                item_id: item.item_id,
                item_name: item.item_name,
                item_emoji: item.item_emoji,
                quantity: item.quantity,
                base_price: item.base_price,
                added_at: now,
            }),
        }
        self.updated_at = now;
    }

    /// Overwrites an item's quantity; zero or below removes the line.
    pub fn set_item_quantity(
        &mut self,
        item_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let position = self
            .items
            .iter()
            .position(|line| line.item_id == item_id)
            .ok_or(Error::ItemNotFound)?;

        if quantity <= 0 {
            self.items.remove(position);
        } else {
            let quantity = u32::try_from(quantity)
                .map_err(|_| Error::BadRequest("quantity is too large".to_string()))?;
            if let Some(line) = self.items.get_mut(position) {
                line.quantity = quantity;
            }
        }
        self.updated_at = now;
        Ok(())
    }

    /// Drops an item if present. Missing items are not an error.
    pub fn remove_item(&mut self, item_id: &str, now: DateTime<Utc>) {
        self.items.retain(|line| line.item_id != item_id);
        self.updated_at = now;
    }
}
