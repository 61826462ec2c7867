// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use validator::ValidationErrors;

use crate::services::ServiceError;

/// Business codes carried in the `code` field of every response envelope.
pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const UNKNOWN: i32 = 1000;
    pub const INVALID_PARAM: i32 = 1001;
    pub const NOT_FOUND: i32 = 1002;
    pub const UNAUTHORIZED: i32 = 1003;
    pub const FORBIDDEN: i32 = 1004;
    pub const INTERNAL: i32 = 1005;
    pub const ALREADY_EXISTS: i32 = 2002;
    pub const DATABASE: i32 = 3001;
}

/// HTTP API error with status codes and client-facing messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict {
        message: String,
        existing_id: Option<i64>,
    },

    // 500 Internal Server Error
    Database { detail: String },
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError { .. } | ApiError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Database { .. } | ApiError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(_) => "invalid request body",
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict { message, .. } => message,
            ApiError::Database { .. } => "database error",
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> i32 {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError { .. } | ApiError::InvalidJson(_) => {
                codes::INVALID_PARAM
            }
            ApiError::Unauthorized(_) => codes::UNAUTHORIZED,
            ApiError::Forbidden(_) => codes::FORBIDDEN,
            ApiError::NotFound(_) => codes::NOT_FOUND,
            ApiError::Conflict { .. } => codes::ALREADY_EXISTS,
            ApiError::Database { .. } => codes::DATABASE,
            ApiError::InternalServerError(_) | ApiError::ServiceUnavailable(_) => codes::INTERNAL,
        }
    }

    /// Response envelope: `{code, message, detail?, data?}`
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "code": self.error_code(),
            "message": self.message(),
        });

        match self {
            ApiError::InvalidJson(detail) | ApiError::Database { detail } => {
                body["detail"] = json!(detail);
            }
            ApiError::ValidationError { field_errors: Some(field_errors), .. } => {
                body["data"] = json!({ "field_errors": field_errors });
            }
            ApiError::Conflict { existing_id: Some(id), .. } => {
                body["data"] = json!({ "existing_id": id });
            }
            _ => {}
        }

        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidRequest(errors) => errors.into(),
            ServiceError::Validation { field, message } => {
                let field_errors = field.map(|f| HashMap::from([(f.to_string(), message.clone())]));
                ApiError::validation_error(message, field_errors)
            }
            err @ (ServiceError::InvalidPage(_) | ServiceError::TemplateInactive(_)) => {
                ApiError::bad_request(err.to_string())
            }
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict { message, existing_id } => ApiError::Conflict { message, existing_id },
            err @ ServiceError::Database { .. } => {
                // The detail is kept for operators; the message stays generic
                tracing::error!(error = %err, "Database operation failed");
                ApiError::Database { detail: err.to_string() }
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (field.to_string(), reason)
            })
            .collect();
        ApiError::validation_error("invalid request parameters", Some(field_errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(format!("invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(format!("invalid query string: {}", rejection.body_text()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseError;
    use crate::pagination::PageError;

    #[test]
    fn conflict_carries_existing_id() {
        let err: ApiError = ServiceError::conflict("already applied", Some(42)).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let body = err.to_json();
        assert_eq!(body["code"], 2002);
        assert_eq!(body["data"]["existing_id"], 42);
    }

    #[test]
    fn page_errors_are_invalid_params() {
        let err: ApiError = ServiceError::InvalidPage(PageError::InvalidSortField("password".into())).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json()["code"], 1001);
        assert_eq!(err.message(), "invalid sort field: password");
    }

    #[test]
    fn database_failures_hide_the_cause_in_detail() {
        let err: ApiError = ServiceError::db("list users")(DatabaseError::QueryError("boom".into())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.to_json();
        assert_eq!(body["code"], 3001);
        assert_eq!(body["message"], "database error");
        assert!(body["detail"].as_str().unwrap().starts_with("list users failed"));
    }

    #[test]
    fn field_validation_is_keyed_by_field() {
        let err: ApiError = ServiceError::validation("options", "options must be a JSON object").into();
        let body = err.to_json();
        assert_eq!(body["code"], 1001);
        assert_eq!(body["data"]["field_errors"]["options"], "options must be a JSON object");
    }
}
