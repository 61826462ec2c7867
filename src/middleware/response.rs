use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{codes, ApiError};

/// Success envelope `{code: 0, message, data}` around a handler's payload
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: &'static str,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            message: "success",
            status_code,
        }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED).with_message("created")
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = message;
        self
    }
}

impl ApiResponse<()> {
    /// `data: null` with a message, for deletes
    pub fn message_only(message: &'static str) -> Self {
        ApiResponse::success(()).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::InternalServerError("failed to serialize response".into())
                    .into_response();
            }
        };

        let envelope = json!({
            "code": codes::SUCCESS,
            "message": self.message,
            "data": data,
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
