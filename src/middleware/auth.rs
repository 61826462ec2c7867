use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{validate_token, Claims};
use crate::error::ApiError;

/// Current user taken from a valid bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// Attaches [`AuthUser`] when an `Authorization: Bearer` header is present.
///
/// Requests without the header pass through untouched; a header that is
/// malformed or carries an invalid token is rejected with 401.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = extract_bearer_token(&headers)? {
        let claims = validate_token(token, &state.config.security.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::unauthorized("invalid or expired token")
        })?;
        tracing::debug!(user_id = claims.sub, "Authenticated request");
        request.extensions_mut().insert(AuthUser::from(claims));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get("authorization") else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid authorization header"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(ApiError::unauthorized("authorization header must be 'Bearer <token>'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_anonymous() {
        assert!(extract_bearer_token(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), Some("abc.def"));

        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
