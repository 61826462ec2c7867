use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bearer token claims. `sub` is the numeric user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    #[serde(default)]
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, username: impl Into<String>, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            username: username.into(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("jwt secret is not configured")]
    MissingSecret,

    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(JwtError::Sign)
}

/// Decodes an HS256 token and checks its expiry.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(JwtError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_user() {
        let token = generate_token(&Claims::new(7, "alice", 1), "secret").unwrap();
        let claims = validate_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn wrong_secret_and_expired_tokens_are_rejected() {
        let token = generate_token(&Claims::new(7, "alice", 1), "secret").unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(JwtError::Invalid(_))));

        let expired = generate_token(&Claims::new(7, "alice", -2), "secret").unwrap();
        assert!(matches!(validate_token(&expired, "secret"), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            generate_token(&Claims::new(1, "a", 1), ""),
            Err(JwtError::MissingSecret)
        ));
    }
}
