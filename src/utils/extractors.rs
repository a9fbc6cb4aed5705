use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    error::{AppError, Result},
    utils::jwt,
};

/// Authenticated caller, pulled from the `Authorization: Bearer` header
/// and verified. Handlers that take this reject unauthenticated
/// requests with 401; catalog read paths simply don't take it.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i32);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

        let claims = jwt::verify_token(token)?;

        let user_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))?;

        Ok(AuthUser(user_id))
    }
}

/// Ownership gate: mutation endpoints only act on resources the
/// requesting user owns. Read paths on the catalog stay public and
/// never go through this.
pub fn authorize(resource_owner_id: i32, requesting_user_id: i32) -> Result<()> {
    if resource_owner_id != requesting_user_id {
        return Err(AppError::Forbidden("User is not authorized".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn set_secret() {
        // Safety: tests all write the same value, so concurrent sets are benign
        unsafe { std::env::set_var("JWT_SECRET", "test-secret") };
    }

    async fn extract(header: Option<String>) -> std::result::Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_bearer_token_yields_user_id() {
        set_secret();
        let token = jwt::generate_token(99).unwrap();
        let AuthUser(user_id) = extract(Some(format!("Bearer {}", token))).await.unwrap();
        assert_eq!(user_id, 99);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        set_secret();
        assert!(matches!(
            extract(None).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        set_secret();
        let token = jwt::generate_token(99).unwrap();
        assert!(extract(Some(format!("Basic {}", token))).await.is_err());
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        set_secret();
        assert!(extract(Some("Bearer junk".to_string())).await.is_err());
    }

    #[test]
    fn authorize_accepts_owner() {
        assert!(authorize(7, 7).is_ok());
    }

    #[test]
    fn authorize_rejects_other_user() {
        assert!(matches!(authorize(7, 8), Err(AppError::Forbidden(_))));
    }
}
