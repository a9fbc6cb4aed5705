use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::json;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateShopAttrs, Shop, ShopResponse, UpdateShopAttrs},
    queries::{product_queries, shop_queries},
    services::upload_service::{self, MultipartForm, UploadKind},
    utils::extractors::{AuthUser, authorize},
};

pub async fn list_shops(State(state): State<AppState>) -> Result<Json<Vec<Shop>>> {
    let shops = shop_queries::list_all(&state.db).await?;

    Ok(Json(shops))
}

pub async fn get_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<i32>,
) -> Result<Json<ShopResponse>> {
    let shop = shop_queries::find_by_id(&state.db, shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))?;

    let products = shop_queries::product_ids_for_shop(&state.db, shop_id).await?;

    Ok(Json(ShopResponse { shop, products }))
}

pub async fn create_shop(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ShopResponse>)> {
    let form = upload_service::collect_form(multipart, UploadKind::Shop).await?;
    let attrs = parse_create_attrs(&form)?;

    let image = match &form.file {
        Some(file) => {
            Some(upload_service::store_image(&state.upload_root, UploadKind::Shop, file).await?)
        }
        None => None,
    };

    let (shop, products) =
        shop_queries::create_shop(&state.db, user_id, &attrs, image.as_deref()).await?;

    tracing::info!("Shop {} created by user {}", shop.id, user_id);

    Ok((StatusCode::CREATED, Json(ShopResponse { shop, products })))
}

pub async fn edit_shop(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(shop_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ShopResponse>> {
    let shop = shop_queries::find_by_id(&state.db, shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))?;

    authorize(shop.owner_id, user_id)?;

    let form = upload_service::collect_form(multipart, UploadKind::Shop).await?;
    let attrs = parse_update_attrs(&form);

    let image = match &form.file {
        Some(file) => {
            Some(upload_service::store_image(&state.upload_root, UploadKind::Shop, file).await?)
        }
        None => None,
    };

    let shop = shop_queries::update_shop(&state.db, shop_id, &attrs, image.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))?;

    let products = shop_queries::product_ids_for_shop(&state.db, shop_id).await?;

    Ok(Json(ShopResponse { shop, products }))
}

pub async fn delete_shop(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(shop_id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let shop = shop_queries::find_by_id(&state.db, shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))?;

    authorize(shop.owner_id, user_id)?;

    shop_queries::delete_shop(&state.db, shop_id).await?;

    tracing::info!("Shop {} deleted by user {}", shop_id, user_id);

    Ok(Json(json!({ "message": "Shop deleted successfully" })))
}

/// Membership set-add. This endpoint has no authentication, matching
/// how the marketplace API behaves today.
pub async fn add_product_to_shop(
    State(state): State<AppState>,
    Path((shop_id, product_id)): Path<(i32, i32)>,
) -> Result<Json<serde_json::Value>> {
    if shop_queries::find_by_id(&state.db, shop_id).await?.is_none() {
        return Err(AppError::NotFound("Shop not found".to_string()));
    }

    if product_queries::find_by_id(&state.db, product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    shop_queries::add_product_to_shop(&state.db, shop_id, product_id).await?;

    Ok(Json(json!({
        "message": "Product successfully added to the shop",
        "productId": product_id,
    })))
}

fn parse_create_attrs(form: &MultipartForm) -> Result<CreateShopAttrs> {
    let name = form
        .get("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Shop name is required".to_string()))?
        .to_string();

    Ok(CreateShopAttrs {
        name,
        description: form
            .get("description")
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        product_ids: parse_product_ids(form)?,
    })
}

fn parse_update_attrs(form: &MultipartForm) -> UpdateShopAttrs {
    UpdateShopAttrs {
        name: form
            .get("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        description: form
            .get("description")
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    }
}

/// `productIds` may arrive as repeated fields or one comma-separated
/// value; both forms are accepted.
fn parse_product_ids(form: &MultipartForm) -> Result<Vec<i32>> {
    let mut ids = Vec::new();

    for value in form.get_all("productIds") {
        for part in value.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let id: i32 = part
                .parse()
                .map_err(|_| AppError::BadRequest(format!("Invalid product id: {}", part)))?;
            ids.push(id);
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }

    #[test]
    fn create_requires_a_name() {
        assert!(parse_create_attrs(&form(&[])).is_err());
        assert!(parse_create_attrs(&form(&[("name", " ")])).is_err());
    }

    #[test]
    fn product_ids_accepts_repeated_fields() {
        let attrs =
            parse_create_attrs(&form(&[("name", "S"), ("productIds", "1"), ("productIds", "2")]))
                .unwrap();
        assert_eq!(attrs.product_ids, vec![1, 2]);
    }

    #[test]
    fn product_ids_accepts_comma_separated_value() {
        let attrs = parse_create_attrs(&form(&[("name", "S"), ("productIds", "3, 4,5")])).unwrap();
        assert_eq!(attrs.product_ids, vec![3, 4, 5]);
    }

    #[test]
    fn malformed_product_id_is_rejected() {
        assert!(parse_create_attrs(&form(&[("name", "S"), ("productIds", "one")])).is_err());
    }

    #[test]
    fn update_attrs_are_all_optional() {
        let attrs = parse_update_attrs(&form(&[]));
        assert!(attrs.name.is_none());
        assert!(attrs.description.is_none());
    }
}
