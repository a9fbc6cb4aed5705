use serde::{Deserialize, Serialize};

use crate::models::Product;

/// One `cart_items` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Line item resolved against the current product record.
#[derive(Debug, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
}

/// A user's cart as returned to the client. A user with no cart row yet
/// reads as an empty one.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: i32,
}
