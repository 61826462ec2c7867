use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::database::DatabaseManager;
use crate::error::codes;
use crate::middleware::ApiResponse;

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> Response {
    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "database": "connected",
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "code": codes::INTERNAL,
                    "message": "service unavailable",
                    "data": { "status": "degraded", "database": "disconnected" },
                })),
            )
                .into_response()
        }
    }
}
