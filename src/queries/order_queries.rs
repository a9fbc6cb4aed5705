use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{Address, Order, OrderItem, PaymentInfo},
};

/// One line of a pending order, assembled by the checkout handler from
/// the requested quantity and the product's current price and name.
#[derive(Debug)]
pub struct OrderItemData {
    pub product_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub product_name: String,
}

/// Creates the order, snapshots its lines and decrements stock, all in
/// one transaction. Stock is only taken when enough remains
/// (`quantity >= ordered`); a short product rolls the whole order back
/// and surfaces a conflict, so stock can never go negative and no
/// partial order is ever visible.
pub async fn create_order_with_items(
    pool: &PgPool,
    user_id: i32,
    billing: &Address,
    shipping: &Address,
    payment: &PaymentInfo,
    items: &[OrderItemData],
) -> Result<(Order, Vec<OrderItem>)> {
    let mut tx = pool.begin().await?;

    let (payment_method, card_name, card_number, card_expiry) = payment.as_columns();

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (user_id,
         billing_street, billing_city, billing_province, billing_postal_code,
         shipping_street, shipping_city, shipping_province, shipping_postal_code,
         payment_method, card_name, card_number, card_expiry)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING *",
    )
    .bind(user_id)
    .bind(&billing.street)
    .bind(&billing.city)
    .bind(&billing.province)
    .bind(&billing.postal_code)
    .bind(&shipping.street)
    .bind(&shipping.city)
    .bind(&shipping.province)
    .bind(&shipping.postal_code)
    .bind(payment_method)
    .bind(card_name)
    .bind(card_number)
    .bind(card_expiry)
    .fetch_one(&mut *tx)
    .await?;

    let product_ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
    let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
    let prices: Vec<Decimal> = items.iter().map(|i| i.price).collect();
    let product_names: Vec<&str> = items.iter().map(|i| i.product_name.as_str()).collect();

    let order_items = sqlx::query_as::<_, OrderItem>(
        "INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase, product_name)
         SELECT $1, unnest($2::int[]), unnest($3::int[]), unnest($4::decimal[]), unnest($5::varchar[])
         RETURNING *",
    )
    .bind(order.id)
    .bind(&product_ids)
    .bind(&quantities)
    .bind(&prices)
    .bind(&product_names)
    .fetch_all(&mut *tx)
    .await?;

    for item in items {
        let result = sqlx::query(
            "UPDATE products
             SET quantity = quantity - $1, updated_at = NOW()
             WHERE id = $2 AND quantity >= $1",
        )
        .bind(item.quantity)
        .bind(item.product_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "Insufficient stock for product {}",
                item.product_id
            )));
        }
    }

    tx.commit().await?;
    Ok((order, order_items))
}

pub async fn get_user_orders(pool: &PgPool, user_id: i32) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn get_items_for_orders(pool: &PgPool, order_ids: &[i32]) -> Result<Vec<OrderItem>> {
    let items =
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ANY($1)")
            .bind(order_ids)
            .fetch_all(pool)
            .await?;

    Ok(items)
}

pub async fn find_by_id(pool: &PgPool, order_id: i32) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;

    Ok(order)
}

pub async fn get_items_for_order(pool: &PgPool, order_id: i32) -> Result<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}
