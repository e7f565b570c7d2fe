use crate::errors::{ApiError, ApiResultExt};
use crate::models::ClearCartResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cart::Cart;
use tracing::info;

/// POST /cart
pub async fn create_cart(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Cart>), ApiError> {
    let cart = state
        .cart_operations
        .create_cart()
        .await
        .or_api_error("Failed to create cart")?;

    Ok((StatusCode::CREATED, Json(cart)))
}

/// GET /cart/:cart_id
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<Cart>, ApiError> {
    info!("GET_CART: cart={}", cart_id);

    let cart = state
        .cart_operations
        .get_cart(&cart_id)
        .await
        .or_api_error("Failed to fetch cart")?;

    Ok(Json(cart))
}

/// DELETE /cart/:cart_id
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<ClearCartResponse>, ApiError> {
    state
        .cart_operations
        .clear_cart(&cart_id)
        .await
        .or_api_error("Failed to clear cart")?;

    Ok(Json(ClearCartResponse {
        message: "Cart cleared successfully".into(),
    }))
}
