use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shop plus its membership list. Products are referenced by id only;
/// membership is not ownership.
#[derive(Debug, Serialize)]
pub struct ShopResponse {
    #[serde(flatten)]
    pub shop: Shop,
    pub products: Vec<i32>,
}

#[derive(Debug)]
pub struct CreateShopAttrs {
    pub name: String,
    pub description: Option<String>,
    pub product_ids: Vec<i32>,
}

#[derive(Debug, Default)]
pub struct UpdateShopAttrs {
    pub name: Option<String>,
    pub description: Option<String>,
}
