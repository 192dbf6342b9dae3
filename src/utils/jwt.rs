// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::account::UserId};

/// Access-token claims, shaped like the hosted auth provider's tokens.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the account id.
    pub sub: String,
    pub email: String,
    /// Always "authenticated" for signed-in users.
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs an access token for the account.
pub fn sign_access_token(
    user_id: &UserId,
    email: &str,
    secret: &str,
    ttl_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + ttl_seconds as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        role: "authenticated".to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Seconds past `exp` a token is still accepted, absorbing clock skew.
pub const LEEWAY_SECONDS: u64 = 60;

/// Decodes and validates an access token, returning its claims.
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.leeway = LEEWAY_SECONDS;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Verifies an access token and returns the account id it was issued to.
///
/// Expired, tampered or malformed tokens all come back as `AuthError`.
pub fn verify_access_token(token: &str, secret: &str) -> Result<UserId, AppError> {
    decode_access_token(token, secret)?
        .sub
        .parse()
        .map(UserId)
        .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn token_round_trips_subject() {
        let id = UserId(Uuid::new_v4());
        let token = sign_access_token(&id, "a@b.c", "secret", 60).unwrap();
        assert_eq!(verify_access_token(&token, "secret").unwrap(), id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let id = UserId(Uuid::new_v4());
        let token = sign_access_token(&id, "a@b.c", "secret", 60).unwrap();
        assert!(matches!(
            verify_access_token(&token, "other"),
            Err(AppError::AuthError(_))
        ));
    }
}
