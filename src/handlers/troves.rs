use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};

use crate::app::AppState;
use crate::database::models::{CreateTroveRequest, Trove, UpdateTroveRequest};
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::{PageParams, PageRequest, PageResponse};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<PageResponse<Trove>> {
    let page = PageRequest::from_params(params);
    Ok(ApiResponse::success(state.troves.list(&page).await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateTroveRequest>, JsonRejection>,
) -> ApiResult<Trove> {
    let Json(req) = body?;
    Ok(ApiResponse::created(state.troves.create(req).await?))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Trove> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.troves.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTroveRequest>, JsonRejection>,
) -> ApiResult<Trove> {
    let Path(id) = path?;
    let Json(req) = body?;
    Ok(ApiResponse::success(state.troves.update(id, req).await?).with_message("updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    state.troves.delete(id).await?;
    Ok(ApiResponse::message_only("deleted"))
}
