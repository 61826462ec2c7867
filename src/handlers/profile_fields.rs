use axum::extract::{rejection::PathRejection, Path, State};

use crate::app::AppState;
use crate::database::models::ProfileField;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/v1/profile/fields/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<ProfileField> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.fields.get_field(id).await?))
}

/// DELETE /api/v1/profile/fields/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    state.fields.delete_field(id).await?;
    Ok(ApiResponse::message_only("deleted"))
}
