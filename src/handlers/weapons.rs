use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};

use crate::app::AppState;
use crate::database::models::{CreateWeaponRequest, UpdateWeaponRequest, Weapon};
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::{PageParams, PageRequest, PageResponse};

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<PageResponse<Weapon>> {
    let page = PageRequest::from_params(params);
    Ok(ApiResponse::success(state.weapons.list(&page).await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateWeaponRequest>, JsonRejection>,
) -> ApiResult<Weapon> {
    let Json(req) = body?;
    Ok(ApiResponse::created(state.weapons.create(req).await?))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Weapon> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.weapons.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateWeaponRequest>, JsonRejection>,
) -> ApiResult<Weapon> {
    let Path(id) = path?;
    let Json(req) = body?;
    Ok(ApiResponse::success(state.weapons.update(id, req).await?).with_message("updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    state.weapons.delete(id).await?;
    Ok(ApiResponse::message_only("deleted"))
}
