mod cart;
mod health;
mod login;
mod orders;
mod products;
mod register;
mod shops;
mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        // auth + profile
        .route("/user/register", post(register::register_user))
        .route("/user/login", post(login::login_user))
        .route("/user/logout", get(login::logout_user))
        .route("/user/list", get(users::list_users))
        .route(
            "/user/{user_id}",
            get(users::get_user).put(users::update_user),
        )
        .route("/user/delete/{user_id}", delete(users::delete_user))
        .route("/user/upload-avatar/{user_id}", post(users::upload_avatar))
        .route(
            "/user/update-password/{user_id}",
            post(users::update_password),
        )
        // catalog: products
        .route("/product/list", get(products::list_products))
        .route("/product/mine", get(products::my_products))
        .route("/product/add", post(products::add_product))
        .route(
            "/product/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/product", delete(products::delete_my_products))
        // catalog: shops
        .route("/shops", get(shops::list_shops))
        .route("/shops/createShop", post(shops::create_shop))
        .route("/shops/delete/{shop_id}", delete(shops::delete_shop))
        .route(
            "/shops/{shop_id}",
            get(shops::get_shop).put(shops::edit_shop),
        )
        .route(
            "/shops/{shop_id}/{product_id}",
            put(shops::add_product_to_shop),
        )
        // cart
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/add", post(cart::add_to_cart))
        .route("/cart/{product_id}", delete(cart::remove_from_cart))
        // orders
        .route("/orders", post(orders::checkout).get(orders::get_orders))
        .route("/orders/{order_id}", get(orders::get_order))
}
