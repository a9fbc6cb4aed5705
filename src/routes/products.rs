use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde_json::json;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateProductAttrs, Product, UpdateProductAttrs},
    queries::product_queries,
    services::upload_service::{self, MultipartForm, UploadKind},
    utils::extractors::AuthUser,
};

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = product_queries::list_all(&state.db).await?;

    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = product_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

pub async fn my_products(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Product>>> {
    let products = product_queries::list_by_creator(&state.db, user_id).await?;

    Ok(Json(products))
}

pub async fn add_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let form = upload_service::collect_form(multipart, UploadKind::Product).await?;
    let attrs = parse_create_attrs(&form)?;

    let image = match &form.file {
        Some(file) => {
            Some(upload_service::store_image(&state.upload_root, UploadKind::Product, file).await?)
        }
        None => None,
    };

    let product =
        product_queries::create_product(&state.db, user_id, &attrs, image.as_deref()).await?;

    tracing::info!("Product {} added by user {}", product.id, user_id);

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let form = upload_service::collect_form(multipart, UploadKind::Product).await?;
    let attrs = parse_update_attrs(&form)?;

    let image = match &form.file {
        Some(file) => {
            Some(upload_service::store_image(&state.upload_root, UploadKind::Product, file).await?)
        }
        None => None,
    };

    let product = product_queries::update_product(&state.db, id, user_id, &attrs, image.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Product not found or unauthorized to update".to_string())
        })?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    if !product_queries::delete_product(&state.db, id, user_id).await? {
        return Err(AppError::NotFound(
            "Product not found or unauthorized to delete".to_string(),
        ));
    }

    tracing::info!("Product {} deleted by user {}", id, user_id);

    Ok(Json(json!({
        "message": format!("Successfully deleted product with id {}", id),
    })))
}

pub async fn delete_my_products(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>> {
    let deleted = product_queries::delete_all_for_creator(&state.db, user_id).await?;

    tracing::info!("Deleted {} products of user {}", deleted, user_id);

    Ok(Json(json!({
        "message": "All user-specific products deleted successfully",
    })))
}

fn parse_create_attrs(form: &MultipartForm) -> Result<CreateProductAttrs> {
    let name = form
        .get("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Product name is required".to_string()))?
        .to_string();

    let price = match form.get("price") {
        Some(raw) => parse_price(raw)?,
        None => Decimal::ZERO,
    };

    let quantity = match form.get("quantity") {
        Some(raw) => parse_quantity(raw)?,
        None => 0,
    };

    Ok(CreateProductAttrs {
        name,
        description: owned_field(form, "description"),
        price,
        quantity,
        category: owned_field(form, "category"),
    })
}

fn parse_update_attrs(form: &MultipartForm) -> Result<UpdateProductAttrs> {
    let price = form.get("price").map(parse_price).transpose()?;
    let quantity = form.get("quantity").map(parse_quantity).transpose()?;

    Ok(UpdateProductAttrs {
        name: form
            .get("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        description: owned_field(form, "description"),
        price,
        quantity,
        category: owned_field(form, "category"),
    })
}

fn parse_price(raw: &str) -> Result<Decimal> {
    let price: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid price".to_string()))?;

    if price < Decimal::ZERO {
        return Err(AppError::BadRequest("Price cannot be negative".to_string()));
    }

    Ok(price)
}

fn parse_quantity(raw: &str) -> Result<i32> {
    let quantity: i32 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid quantity".to_string()))?;

    if quantity < 0 {
        return Err(AppError::BadRequest(
            "Quantity cannot be negative".to_string(),
        ));
    }

    Ok(quantity)
}

fn owned_field(form: &MultipartForm, name: &str) -> Option<String> {
    form.get(name).filter(|v| !v.is_empty()).map(str::to_string)
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
    fn create_parses_full_form() {
        let attrs = parse_create_attrs(&form(&[
            ("name", "Mug"),
            ("description", "A mug"),
            ("price", "12.50"),
            ("quantity", "5"),
            ("category", "kitchen"),
        ]))
        .unwrap();

        assert_eq!(attrs.name, "Mug");
        assert_eq!(attrs.price, "12.50".parse::<Decimal>().unwrap());
        assert_eq!(attrs.quantity, 5);
        assert_eq!(attrs.category.as_deref(), Some("kitchen"));
    }

    #[test]
    fn create_defaults_price_and_quantity_to_zero() {
        let attrs = parse_create_attrs(&form(&[("name", "Mug")])).unwrap();
        assert_eq!(attrs.price, Decimal::ZERO);
        assert_eq!(attrs.quantity, 0);
        assert!(attrs.description.is_none());
    }

    #[test]
    fn create_requires_a_name() {
        assert!(parse_create_attrs(&form(&[("price", "1")])).is_err());
        assert!(parse_create_attrs(&form(&[("name", "  ")])).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(parse_create_attrs(&form(&[("name", "Mug"), ("price", "-1")])).is_err());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        assert!(parse_create_attrs(&form(&[("name", "Mug"), ("quantity", "-3")])).is_err());
    }

    #[test]
    fn update_leaves_absent_fields_untouched() {
        let attrs = parse_update_attrs(&form(&[("price", "9.99")])).unwrap();
        assert!(attrs.name.is_none());
        assert!(attrs.quantity.is_none());
        assert_eq!(attrs.price, Some("9.99".parse().unwrap()));
    }

    #[test]
    fn update_rejects_malformed_quantity() {
        assert!(parse_update_attrs(&form(&[("quantity", "lots")])).is_err());
    }
}
