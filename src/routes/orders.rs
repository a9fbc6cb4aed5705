use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CheckoutRequest, OrderResponse},
    queries::{
        order_queries::{self, OrderItemData},
        product_queries,
    },
    utils::extractors::AuthUser,
};

/// Turns the submitted line-item snapshot into an immutable order and
/// takes the stock. The cart itself is left alone; the client clears it
/// after a successful checkout.
pub async fn checkout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    validate_checkout(&payload)?;

    let requested_ids: Vec<i32> = payload.items.iter().map(|i| i.product_id).collect();
    let products = product_queries::find_by_ids(&state.db, &requested_ids).await?;

    let mut order_items = Vec::with_capacity(payload.items.len());

    for item in &payload.items {
        let product = products.get(&item.product_id).ok_or_else(|| {
            AppError::NotFound(format!("Product {} not found", item.product_id))
        })?;

        order_items.push(OrderItemData {
            product_id: item.product_id,
            quantity: item.quantity,
            price: product.price,
            product_name: product.name.clone(),
        });
    }

    let (order, items) = order_queries::create_order_with_items(
        &state.db,
        user_id,
        &payload.billing_address,
        &payload.shipping_address,
        &payload.payment_info,
        &order_items,
    )
    .await?;

    tracing::info!("Order {} placed by user {}", order.id, user_id);

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::from_parts(order, items)),
    ))
}

pub async fn get_orders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = order_queries::get_user_orders(&state.db, user_id).await?;

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let all_items = order_queries::get_items_for_orders(&state.db, &order_ids).await?;

    let mut items_map: HashMap<i32, Vec<_>> = HashMap::new();
    for item in all_items {
        items_map.entry(item.order_id).or_default().push(item);
    }

    let response = orders
        .into_iter()
        .map(|order| {
            let items = items_map.remove(&order.id).unwrap_or_default();
            OrderResponse::from_parts(order, items)
        })
        .collect();

    Ok(Json(response))
}

/// Fetch by id. Requires a valid session but not ownership of the
/// order, matching how the marketplace API behaves today.
pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderResponse>> {
    let order = order_queries::find_by_id(&state.db, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let items = order_queries::get_items_for_order(&state.db, order_id).await?;

    Ok(Json(OrderResponse::from_parts(order, items)))
}

fn validate_checkout(payload: &CheckoutRequest) -> Result<()> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    for item in &payload.items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity for product {}",
                item.product_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, OrderLineRequest, PaymentInfo};

    fn address() -> Address {
        Address {
            street: "1 Main St".to_string(),
            city: "Halifax".to_string(),
            province: "NS".to_string(),
            postal_code: "B3H 0A1".to_string(),
        }
    }

    fn request(items: Vec<OrderLineRequest>) -> CheckoutRequest {
        CheckoutRequest {
            items,
            billing_address: address(),
            shipping_address: address(),
            payment_info: PaymentInfo::Pickup,
        }
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        let err = validate_checkout(&request(vec![])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let req = request(vec![OrderLineRequest {
            product_id: 1,
            quantity: 0,
        }]);
        assert!(validate_checkout(&req).is_err());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let req = request(vec![OrderLineRequest {
            product_id: 1,
            quantity: -2,
        }]);
        assert!(validate_checkout(&req).is_err());
    }

    #[test]
    fn positive_quantities_pass() {
        let req = request(vec![
            OrderLineRequest {
                product_id: 1,
                quantity: 2,
            },
            OrderLineRequest {
                product_id: 2,
                quantity: 1,
            },
        ]);
        assert!(validate_checkout(&req).is_ok());
    }
}
