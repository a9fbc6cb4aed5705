use sqlx::PgPool;

use crate::{
    error::Result,
    models::{CreateShopAttrs, Shop, UpdateShopAttrs},
};

/// Creates the shop and, when product ids are supplied, attaches them.
/// Attached products are reassigned to the shop owner first; that is
/// how the marketplace behaves today.
pub async fn create_shop(
    pool: &PgPool,
    owner_id: i32,
    attrs: &CreateShopAttrs,
    image: Option<&str>,
) -> Result<(Shop, Vec<i32>)> {
    let mut tx = pool.begin().await?;

    let shop = sqlx::query_as::<_, Shop>(
        "INSERT INTO shops (name, description, image, owner_id)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&attrs.name)
    .bind(attrs.description.as_deref())
    .bind(image)
    .bind(owner_id)
    .fetch_one(&mut *tx)
    .await?;

    if !attrs.product_ids.is_empty() {
        sqlx::query("UPDATE products SET created_by = $1, updated_at = NOW() WHERE id = ANY($2)")
            .bind(owner_id)
            .bind(&attrs.product_ids)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO shop_products (shop_id, product_id)
             SELECT $1, unnest($2::int[])
             ON CONFLICT DO NOTHING",
        )
        .bind(shop.id)
        .bind(&attrs.product_ids)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let products = product_ids_for_shop(pool, shop.id).await?;
    Ok((shop, products))
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Shop>> {
    let shops = sqlx::query_as::<_, Shop>("SELECT * FROM shops ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(shops)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Shop>> {
    let shop = sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(shop)
}

pub async fn product_ids_for_shop(pool: &PgPool, shop_id: i32) -> Result<Vec<i32>> {
    let ids: Vec<(i32,)> = sqlx::query_as(
        "SELECT product_id FROM shop_products WHERE shop_id = $1 ORDER BY added_at ASC",
    )
    .bind(shop_id)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().map(|(id,)| id).collect())
}

pub async fn update_shop(
    pool: &PgPool,
    shop_id: i32,
    attrs: &UpdateShopAttrs,
    image: Option<&str>,
) -> Result<Option<Shop>> {
    let shop = sqlx::query_as::<_, Shop>(
        "UPDATE shops
         SET name = COALESCE($1, name),
             description = COALESCE($2, description),
             image = COALESCE($3, image),
             updated_at = NOW()
         WHERE id = $4
         RETURNING *",
    )
    .bind(attrs.name.as_deref())
    .bind(attrs.description.as_deref())
    .bind(image)
    .bind(shop_id)
    .fetch_optional(pool)
    .await?;

    Ok(shop)
}

/// Removes the shop record and its membership rows; member products are
/// untouched.
pub async fn delete_shop(pool: &PgPool, shop_id: i32) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM shop_products WHERE shop_id = $1")
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM shops WHERE id = $1")
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Idempotent set-add: a product appears at most once per shop.
pub async fn add_product_to_shop(pool: &PgPool, shop_id: i32, product_id: i32) -> Result<()> {
    sqlx::query(
        "INSERT INTO shop_products (shop_id, product_id)
         VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
    )
    .bind(shop_id)
    .bind(product_id)
    .execute(pool)
    .await?;

    Ok(())
}
