use axum::{Json, extract::State};
use serde_json::json;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AuthResponse, LoginRequest},
    queries::user_queries,
    utils::{jwt, password},
};

pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = user_queries::find_by_username_or_email(&state.db, &payload.username_or_email)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid username or password".to_string())
        })?;

    if !password::verify_password(&payload.password, &user.salt, &user.hashed_password) {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = jwt::generate_token(user.id)?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        token,
        is_authenticated: true,
        user: user.into(),
    }))
}

/// Sessions are stateless and tokens carry no expiry, so logout is a
/// client-side act: the server only acknowledges.
pub async fn logout_user() -> Json<serde_json::Value> {
    Json(json!({ "message": "Logged out" }))
}
