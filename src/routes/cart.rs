use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AddToCartRequest, CartLine, CartResponse},
    queries::{cart_queries, product_queries},
    utils::extractors::AuthUser,
};

pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CartResponse>> {
    Ok(Json(load_cart(&state, user_id).await?))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    if product_queries::find_by_id(&state.db, payload.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    cart_queries::add_item(&state.db, user_id, payload.product_id).await?;

    Ok(Json(load_cart(&state, user_id).await?))
}

/// Removes the whole line, whatever its quantity. A product that is not
/// in the cart is not an error.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(product_id): Path<i32>,
) -> Result<Json<CartResponse>> {
    cart_queries::remove_item(&state.db, user_id, product_id).await?;

    Ok(Json(load_cart(&state, user_id).await?))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CartResponse>> {
    cart_queries::clear(&state.db, user_id).await?;

    Ok(Json(load_cart(&state, user_id).await?))
}

/// Lines resolved against current product records; a product deleted
/// out from under a cart simply drops off.
async fn load_cart(state: &AppState, user_id: i32) -> Result<CartResponse> {
    let items = cart_queries::get_items(&state.db, user_id).await?;

    let product_ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
    let mut products = product_queries::find_by_ids(&state.db, &product_ids).await?;

    let lines = items
        .into_iter()
        .filter_map(|item| {
            products.remove(&item.product_id).map(|product| CartLine {
                product,
                quantity: item.quantity,
            })
        })
        .collect();

    Ok(CartResponse { items: lines })
}
