use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::database::models::{
    CreateFieldTemplateRequest, FieldTemplate, TemplateFilter, UpdateFieldTemplateRequest,
};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::pagination::{PageParams, PageRequest, PageResponse};
use crate::services::{ApplyTemplateResult, ApplyTemplatesResult};

#[derive(Debug, Default, Deserialize)]
pub struct TemplateListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub category: Option<String>,
    pub field_type: Option<String>,
    pub is_active: Option<String>,
}

impl TemplateListQuery {
    /// Empty strings mean "no filter". An unparsable `is_active` is ignored.
    fn filter(&self) -> TemplateFilter {
        let non_empty = |s: &Option<String>| s.as_deref().filter(|v| !v.is_empty()).map(String::from);
        TemplateFilter {
            category: non_empty(&self.category),
            field_type: non_empty(&self.field_type),
            is_active: self.is_active.as_deref().and_then(parse_bool),
        }
    }
}

/// Accepts 1/t/T/TRUE/true/True and 0/f/F/FALSE/false/False.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchApplyRequest {
    #[validate(length(min = 1, message = "at least one template id is required"))]
    pub template_ids: Vec<i64>,
    #[serde(default)]
    pub user_id: i64,
}

/// Body id wins; otherwise the bearer token's user. Zero means "none".
fn resolve_user_id(body_user_id: i64, auth: Option<&AuthUser>) -> i64 {
    if body_user_id != 0 {
        return body_user_id;
    }
    auth.map(|user| user.user_id).unwrap_or(0)
}

/// GET /api/v1/profile/field-templates
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TemplateListQuery>,
) -> ApiResult<PageResponse<FieldTemplate>> {
    let filter = query.filter();
    let page = PageRequest::from_params(query.page);
    Ok(ApiResponse::success(
        state.templates.list_templates(&filter, &page).await?,
    ))
}

/// POST /api/v1/profile/field-templates
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateFieldTemplateRequest>, JsonRejection>,
) -> ApiResult<FieldTemplate> {
    let Json(req) = body?;
    Ok(ApiResponse::created(state.templates.create_template(req).await?))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<FieldTemplate> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.templates.get_template(id).await?))
}

pub async fn get_by_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<FieldTemplate> {
    if key.trim().is_empty() {
        return Err(ApiError::bad_request("field key is required"));
    }
    Ok(ApiResponse::success(
        state.templates.get_template_by_key(&key).await?,
    ))
}

pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Vec<FieldTemplate>> {
    if category.trim().is_empty() {
        return Err(ApiError::bad_request("category is required"));
    }
    Ok(ApiResponse::success(
        state.templates.templates_by_category(&category).await?,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateFieldTemplateRequest>, JsonRejection>,
) -> ApiResult<FieldTemplate> {
    let Path(id) = path?;
    let Json(req) = body?;
    Ok(ApiResponse::success(state.templates.update_template(id, req).await?).with_message("updated"))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    state.templates.delete_template(id).await?;
    Ok(ApiResponse::message_only("deleted"))
}

/// POST /api/v1/profile/field-templates/:id/apply
///
/// A missing or unreadable body is not an error here; the user then comes
/// from the bearer token.
pub async fn apply(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    path: Result<Path<i64>, PathRejection>,
    body: Option<Json<ApplyRequest>>,
) -> ApiResult<ApplyTemplateResult> {
    let Path(template_id) = path?;
    let body_user_id = body.map(|Json(req)| req.user_id).unwrap_or_default();
    let user_id = resolve_user_id(body_user_id, auth.as_ref().map(|Extension(user)| user));

    let result = state
        .templates
        .apply_template_to_user(template_id, user_id)
        .await?;
    Ok(ApiResponse::success(result).with_message("applied"))
}

/// POST /api/v1/profile/field-templates/apply
pub async fn apply_batch(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Result<Json<BatchApplyRequest>, JsonRejection>,
) -> ApiResult<ApplyTemplatesResult> {
    let Json(req) = body?;
    req.validate()?;
    let user_id = resolve_user_id(req.user_id, auth.as_ref().map(|Extension(user)| user));

    let result = state
        .templates
        .apply_templates_to_user(&req.template_ids, user_id)
        .await?;
    Ok(ApiResponse::success(result).with_message("applied"))
}
