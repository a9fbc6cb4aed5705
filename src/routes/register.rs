use axum::{Json, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{AuthResponse, RegisterRequest},
    queries::user_queries,
    utils::{jwt, password},
};

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    validate_registration(&payload)?;

    // Uniqueness is exact and case-sensitive; login matching is looser.
    if user_queries::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    if user_queries::find_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let salt = password::generate_salt();
    let hashed_password = password::hash_password(&payload.password, &salt);

    let user = user_queries::create_user(
        &state.db,
        &payload.username,
        &payload.email,
        &payload.name,
        &salt,
        &hashed_password,
    )
    .await?;

    let token = jwt::generate_token(user.id)?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok(Json(AuthResponse {
        token,
        is_authenticated: true,
        user: user.into(),
    }))
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    if payload.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }

    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            username: "shopper".to_string(),
            email: "shopper@example.com".to_string(),
            name: "A Shopper".to_string(),
            password: "hunter2hunter2".to_string(),
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(validate_registration(&request()).is_ok());
    }

    #[test]
    fn rejects_blank_username() {
        let mut req = request();
        req.username = "   ".to_string();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn rejects_email_without_at_sign() {
        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn rejects_short_password() {
        let mut req = request();
        req.password = "short".to_string();
        assert!(validate_registration(&req).is_err());
    }
}
