use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{CreateProductAttrs, Product, UpdateProductAttrs},
};

pub async fn create_product(
    pool: &PgPool,
    created_by: i32,
    attrs: &CreateProductAttrs,
    image: Option<&str>,
) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, quantity, category, image, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(&attrs.name)
    .bind(attrs.description.as_deref())
    .bind(attrs.price)
    .bind(attrs.quantity)
    .bind(attrs.category.as_deref())
    .bind(image)
    .bind(created_by)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn find_by_ids(pool: &PgPool, ids: &[i32]) -> Result<HashMap<i32, Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(products)
}

pub async fn list_by_creator(pool: &PgPool, user_id: i32) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE created_by = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// Partial update, restricted to the creator. `None` when the product
/// is missing or owned by someone else; the two cases are deliberately
/// indistinguishable.
pub async fn update_product(
    pool: &PgPool,
    id: i32,
    requester_id: i32,
    attrs: &UpdateProductAttrs,
    image: Option<&str>,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products
         SET name = COALESCE($1, name),
             description = COALESCE($2, description),
             price = COALESCE($3, price),
             quantity = COALESCE($4, quantity),
             category = COALESCE($5, category),
             image = COALESCE($6, image),
             updated_at = NOW()
         WHERE id = $7 AND created_by = $8
         RETURNING *",
    )
    .bind(attrs.name.as_deref())
    .bind(attrs.description.as_deref())
    .bind(attrs.price)
    .bind(attrs.quantity)
    .bind(attrs.category.as_deref())
    .bind(image)
    .bind(id)
    .bind(requester_id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

/// Creator-only delete. Membership rows in every shop and any cart
/// lines referencing the product go in the same transaction, so a
/// partial cascade can never be observed.
pub async fn delete_product(pool: &PgPool, id: i32, requester_id: i32) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let owned: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(requester_id)
            .fetch_optional(&mut *tx)
            .await?;

    if owned.is_none() {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("DELETE FROM shop_products WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM cart_items WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

pub async fn delete_all_for_creator(pool: &PgPool, user_id: i32) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM shop_products
         WHERE product_id IN (SELECT id FROM products WHERE created_by = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "DELETE FROM cart_items
         WHERE product_id IN (SELECT id FROM products WHERE created_by = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM products WHERE created_by = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}
