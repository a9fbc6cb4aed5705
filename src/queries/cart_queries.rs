use sqlx::PgPool;

use crate::{error::Result, models::CartItem};

/// Lines of the user's cart, oldest first. A user without a cart row
/// simply has no lines.
pub async fn get_items(pool: &PgPool, user_id: i32) -> Result<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
        "SELECT ci.product_id, ci.quantity
         FROM cart_items ci
         JOIN carts c ON c.id = ci.cart_id
         WHERE c.user_id = $1
         ORDER BY ci.added_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Creates the cart on first use, then upserts the line: an existing
/// line gains one unit, a new line starts at one. The single upsert
/// keeps concurrent adds from losing increments.
pub async fn add_item(pool: &PgPool, user_id: i32, product_id: i32) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO cart_items (cart_id, product_id, quantity)
         SELECT id, $2::int, 1 FROM carts WHERE user_id = $1
         ON CONFLICT (cart_id, product_id)
         DO UPDATE SET quantity = cart_items.quantity + 1",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE carts SET updated_at = NOW() WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Drops the whole line regardless of quantity; absent lines are a
/// no-op.
pub async fn remove_item(pool: &PgPool, user_id: i32, product_id: i32) -> Result<()> {
    sqlx::query(
        "DELETE FROM cart_items ci
         USING carts c
         WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Empties the cart but keeps the cart row for future use.
pub async fn clear(pool: &PgPool, user_id: i32) -> Result<()> {
    sqlx::query(
        "DELETE FROM cart_items ci
         USING carts c
         WHERE ci.cart_id = c.id AND c.user_id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}
