use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};

use crate::app::AppState;
use crate::database::models::{ProfileField, UpdateUserRequest, User};
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::{PageParams, PageRequest, PageResponse};

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<PageResponse<User>> {
    let page = PageRequest::from_params(params);
    Ok(ApiResponse::success(state.users.list_users(&page).await?))
}

/// GET /api/v1/users/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.users.get_user(id).await?))
}

/// PUT /api/v1/users/:id
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Path(id) = path?;
    let Json(req) = body?;
    Ok(ApiResponse::success(state.users.update_user(id, req).await?).with_message("updated"))
}

/// DELETE /api/v1/users/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    state.users.delete_user(id).await?;
    Ok(ApiResponse::message_only("deleted"))
}

/// GET /api/v1/users/:id/profile-fields
pub async fn profile_fields(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    Query(params): Query<PageParams>,
) -> ApiResult<PageResponse<ProfileField>> {
    let Path(user_id) = path?;
    let page = PageRequest::from_params(params);
    Ok(ApiResponse::success(
        state.fields.list_user_fields(user_id, &page).await?,
    ))
}
