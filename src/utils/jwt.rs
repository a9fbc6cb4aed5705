use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{AppError, Result};

/// Session claims. There is no `exp`: a token stays valid until the
/// signing secret is rotated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
}

pub fn generate_token(user_id: i32) -> Result<String> {
    let jwt_secret = env::var("JWT_SECRET")
        .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?;

    let claims = Claims {
        sub: user_id.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token generation failed: {}", e)))
}

pub fn verify_token(token: &str) -> Result<Claims> {
    let jwt_secret = env::var("JWT_SECRET")
        .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_secret() {
        // Safety: tests all write the same value, so concurrent sets are benign
        unsafe { std::env::set_var("JWT_SECRET", "test-secret") };
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        set_secret();
        let token = generate_token(42).expect("sign");
        let claims = verify_token(&token).expect("verify");
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn tampered_token_is_rejected() {
        set_secret();
        let token = generate_token(42).expect("sign");
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(verify_token(&tampered).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        set_secret();
        assert!(verify_token("not-a-jwt").is_err());
    }
}
