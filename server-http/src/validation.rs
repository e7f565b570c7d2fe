use crate::models::{AddItemRequest, UpdateItemRequest};
use cart::LineItemDraft;
use shared::Error;

/// Add-item bodies are checked by the cart service itself, after the chaos
/// pre-check, so this is a plain field mapping.
impl From<AddItemRequest> for LineItemDraft {
    fn from(req: AddItemRequest) -> Self {
        Self {
            item_id: req.item_id,
            item_name: req.item_name,
            item_emoji: req.item_emoji,
            quantity: req.quantity,
            base_price: req.base_price,
        }
    }
}

impl UpdateItemRequest {
    /// Any integer is accepted; non-positive values remove the item.
    pub fn quantity(&self) -> Result<i64, Error> {
        self.quantity
            .ok_or_else(|| Error::BadRequest("quantity is required".to_string()))
    }
}
