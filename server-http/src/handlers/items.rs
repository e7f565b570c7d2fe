use crate::errors::{ApiError, ApiResultExt};
use crate::models::{AddItemRequest, UpdateItemRequest};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use cart::Cart;

/// POST /cart/:cart_id/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    body: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<Cart>, ApiError> {
    const CONTEXT: &str = "Failed to add item to cart";

    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            // Chaos still wins over an unreadable body
            state
                .cart_operations
                .check_add_item_chaos(&cart_id)
                .await
                .or_api_error(CONTEXT)?;
            return Err(ApiError::from_rejection(rejection, CONTEXT));
        }
    };

    let cart = state
        .cart_operations
        .add_item(&cart_id, req.into())
        .await
        .or_api_error(CONTEXT)?;

    Ok(Json(cart))
}

/// PATCH /cart/:cart_id/items/:item_id
pub async fn update_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(String, String)>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<Cart>, ApiError> {
    const CONTEXT: &str = "Failed to update cart item";

    let Json(req) = body.map_err(|rejection| ApiError::from_rejection(rejection, CONTEXT))?;
    let quantity = req.quantity().or_api_error(CONTEXT)?;

    let cart = state
        .cart_operations
        .update_item_quantity(&cart_id, &item_id, quantity)
        .await
        .or_api_error(CONTEXT)?;

    Ok(Json(cart))
}

/// DELETE /cart/:cart_id/items/:item_id
pub async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(String, String)>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state
        .cart_operations
        .remove_item(&cart_id, &item_id)
        .await
        .or_api_error("Failed to remove cart item")?;

    Ok(Json(cart))
}
