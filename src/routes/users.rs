use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde_json::json;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{PublicUser, UpdatePasswordRequest, UpdateUserRequest},
    queries::user_queries,
    services::upload_service::{self, UploadKind},
    utils::{
        extractors::{AuthUser, authorize},
        password,
    },
};

/// Public directory; credential material never leaves the queries
/// layer.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>> {
    let users = user_queries::list_public(&state.db).await?;

    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(requester_id): AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<PublicUser>> {
    authorize(user_id, requester_id)?;

    let user = user_queries::find_public_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(requester_id): AuthUser,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>> {
    authorize(user_id, requester_id)?;
    validate_update(&payload)?;

    let user = user_queries::update_user(&state.db, user_id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(requester_id): AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    authorize(user_id, requester_id)?;

    if !user_queries::delete_user(&state.db, user_id).await? {
        return Err(AppError::NotFound(format!(
            "User with id {} not found",
            user_id
        )));
    }

    tracing::info!("Deleted user {}", user_id);

    Ok(Json(json!({
        "message": format!("Successfully deleted user with id {}", user_id),
    })))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(requester_id): AuthUser,
    Path(user_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    authorize(user_id, requester_id)?;

    let form = upload_service::collect_form(multipart, UploadKind::Avatar).await?;
    let image = form
        .file
        .ok_or_else(|| AppError::BadRequest("File upload error".to_string()))?;

    let filename = upload_service::store_image(&state.upload_root, UploadKind::Avatar, &image).await?;

    user_queries::update_avatar(&state.db, user_id, &filename).await?;

    Ok(Json(json!({ "message": "File uploaded successfully" })))
}

pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(requester_id): AuthUser,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    authorize(user_id, requester_id)?;

    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&payload.current_password, &user.salt, &user.hashed_password) {
        return Err(AppError::Unauthorized(
            "Invalid current password".to_string(),
        ));
    }

    // The salt is kept; only the derived hash changes.
    let hashed_password = password::hash_password(&payload.new_password, &user.salt);
    user_queries::update_password(&state.db, user_id, &hashed_password).await?;

    tracing::info!("Password updated for user {}", user_id);

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

fn validate_update(payload: &UpdateUserRequest) -> Result<()> {
    if let Some(username) = &payload.username {
        if username.trim().is_empty() {
            return Err(AppError::BadRequest("Username cannot be empty".to_string()));
        }
    }

    if let Some(email) = &payload.email {
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
    }

    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_no_fields_is_valid() {
        let payload = UpdateUserRequest {
            username: None,
            email: None,
            name: None,
        };
        assert!(validate_update(&payload).is_ok());
    }

    #[test]
    fn update_rejects_bad_email() {
        let payload = UpdateUserRequest {
            username: None,
            email: Some("nope".to_string()),
            name: None,
        };
        assert!(validate_update(&payload).is_err());
    }

    #[test]
    fn update_rejects_blank_username() {
        let payload = UpdateUserRequest {
            username: Some("  ".to_string()),
            email: None,
            name: None,
        };
        assert!(validate_update(&payload).is_err());
    }
}
