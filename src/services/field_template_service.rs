use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{
    CreateFieldTemplateRequest, FieldTemplate, NewFieldTemplate, TemplateFilter,
    UpdateFieldTemplateRequest,
};
use crate::database::repositories::{FieldTemplateRepository, ProfileFieldRepository};
use crate::database::DatabaseError;
use crate::pagination::{PageRequest, PageResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyTemplateResult {
    pub field_id: i64,
    pub field_key: String,
    pub field_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    pub template_id: i64,
    pub reason: String,
}

/// Outcome of a batch apply. Both lists keep the order of the input ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyTemplatesResult {
    pub applied_fields: Vec<ApplyTemplateResult>,
    pub failed_items: Vec<FailedItem>,
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub message: String,
}

/// Template lifecycle plus applying templates to users.
pub struct FieldTemplateService {
    templates: Arc<dyn FieldTemplateRepository>,
    fields: Arc<dyn ProfileFieldRepository>,
}

impl FieldTemplateService {
    pub fn new(
        templates: Arc<dyn FieldTemplateRepository>,
        fields: Arc<dyn ProfileFieldRepository>,
    ) -> Self {
        Self { templates, fields }
    }

    pub async fn create_template(&self, req: CreateFieldTemplateRequest) -> ServiceResult<FieldTemplate> {
        req.validate()?;

        let existing = self
            .templates
            .find_by_key(&req.field_key)
            .await
            .map_err(ServiceError::db("find field template"))?;
        if let Some(existing) = existing {
            return Err(duplicate_key(&req.field_key, Some(existing.id)));
        }

        ensure_json_object("options", &req.options)?;
        ensure_json_object("validation", &req.validation)?;
        ensure_json_object("default_unlock_rules", &req.default_unlock_rules)?;

        let new_template = NewFieldTemplate::from(req);
        match self.templates.create(&new_template).await {
            Ok(template) => {
                info!(template_id = template.id, field_key = %template.field_key, "Field template created");
                Ok(template)
            }
            Err(err) if err.is_unique_violation() => {
                warn!(field_key = %new_template.field_key, "Field key taken concurrently");
                Err(duplicate_key(&new_template.field_key, None))
            }
            Err(err) => Err(ServiceError::db("create field template")(err)),
        }
    }

    pub async fn get_template(&self, id: i64) -> ServiceResult<FieldTemplate> {
        self.templates
            .find_by_id(id)
            .await
            .map_err(ServiceError::db("find field template"))?
            .ok_or_else(template_not_found)
    }

    pub async fn get_template_by_key(&self, field_key: &str) -> ServiceResult<FieldTemplate> {
        self.templates
            .find_by_key(field_key)
            .await
            .map_err(ServiceError::db("find field template"))?
            .ok_or_else(template_not_found)
    }

    pub async fn update_template(
        &self,
        id: i64,
        req: UpdateFieldTemplateRequest,
    ) -> ServiceResult<FieldTemplate> {
        req.validate()?;
        let mut template = self.get_template(id).await?;

        ensure_json_object("options", &req.options)?;
        ensure_json_object("validation", &req.validation)?;
        ensure_json_object("default_unlock_rules", &req.default_unlock_rules)?;

        template.apply_update(req);
        let updated = self.templates.update(&template).await.map_err(|err| match err {
            DatabaseError::NotFound(_) => template_not_found(),
            other => ServiceError::db("update field template")(other),
        })?;

        info!(template_id = id, is_active = updated.is_active, "Field template updated");
        Ok(updated)
    }

    pub async fn delete_template(&self, id: i64) -> ServiceResult<()> {
        let deleted = self
            .templates
            .soft_delete(id)
            .await
            .map_err(ServiceError::db("delete field template"))?;
        if !deleted {
            return Err(template_not_found());
        }
        info!(template_id = id, "Field template deleted");
        Ok(())
    }

    pub async fn list_templates(
        &self,
        filter: &TemplateFilter,
        page: &PageRequest,
    ) -> ServiceResult<PageResponse<FieldTemplate>> {
        let (templates, total) = self
            .templates
            .list(filter, page)
            .await
            .map_err(ServiceError::db("list field templates"))?;
        Ok(PageResponse::new(templates, total, page.page, page.page_size))
    }

    pub async fn templates_by_category(&self, category: &str) -> ServiceResult<Vec<FieldTemplate>> {
        self.templates
            .list_by_category(category)
            .await
            .map_err(ServiceError::db("list field templates"))
    }

    /// Copies template `template_id` into a new profile field owned by `user_id`.
    ///
    /// Checks run in a fixed order: missing template, inactive template, then
    /// an existing field with the same key. A unique violation on insert (a
    /// concurrent apply won) is reported as the same conflict.
    pub async fn apply_template_to_user(
        &self,
        template_id: i64,
        user_id: i64,
    ) -> ServiceResult<ApplyTemplateResult> {
        ensure_user_id(user_id)?;

        let template = self.get_template(template_id).await?;
        if !template.is_active {
            return Err(ServiceError::TemplateInactive(template_id));
        }

        if let Some(existing) = self.find_user_field(user_id, &template.field_key).await? {
            return Err(already_applied(Some(existing)));
        }

        let new_field = template.apply_to_user(user_id);
        match self.fields.create(&new_field).await {
            Ok(field) => {
                info!(template_id, user_id, field_id = field.id, "Field template applied");
                Ok(ApplyTemplateResult {
                    field_id: field.id,
                    field_key: field.field_key,
                    field_name: field.field_name,
                    message: "field template applied".to_string(),
                })
            }
            Err(err) if err.is_unique_violation() => {
                let existing = self.find_user_field(user_id, &template.field_key).await?;
                Err(already_applied(existing))
            }
            Err(err) => Err(ServiceError::db("create profile field")(err)),
        }
    }

    /// Applies each template in turn. Failures are recorded per item and
    /// never stop the batch.
    pub async fn apply_templates_to_user(
        &self,
        template_ids: &[i64],
        user_id: i64,
    ) -> ServiceResult<ApplyTemplatesResult> {
        ensure_user_id(user_id)?;

        let mut applied_fields = Vec::new();
        let mut failed_items = Vec::new();
        for &template_id in template_ids {
            match self.apply_template_to_user(template_id, user_id).await {
                Ok(applied) => applied_fields.push(applied),
                Err(err) => failed_items.push(FailedItem {
                    template_id,
                    reason: failure_reason(template_id, user_id, err),
                }),
            }
        }

        let success_count = applied_fields.len();
        let message = if success_count > 0 {
            format!("applied {} field templates", success_count)
        } else {
            "no field templates were applied".to_string()
        };
        info!(user_id, total = template_ids.len(), success_count, "Batch template apply finished");

        Ok(ApplyTemplatesResult {
            total_count: template_ids.len(),
            success_count,
            failed_count: failed_items.len(),
            applied_fields,
            failed_items,
            message,
        })
    }

    async fn find_user_field(&self, user_id: i64, field_key: &str) -> ServiceResult<Option<i64>> {
        let field = self
            .fields
            .find_by_user_and_key(user_id, field_key)
            .await
            .map_err(ServiceError::db("find profile field"))?;
        Ok(field.map(|f| f.id))
    }
}

fn template_not_found() -> ServiceError {
    ServiceError::not_found("field template not found")
}

fn duplicate_key(field_key: &str, existing_id: Option<i64>) -> ServiceError {
    ServiceError::conflict(format!("field key already exists: {}", field_key), existing_id)
}

fn already_applied(existing_id: Option<i64>) -> ServiceError {
    let message = match existing_id {
        Some(id) => format!("user already applied this field template, field id: {}", id),
        None => "user already applied this field template".to_string(),
    };
    ServiceError::conflict(message, existing_id)
}

/// Database causes are logged, never returned to the caller.
fn failure_reason(template_id: i64, user_id: i64, err: ServiceError) -> String {
    match err {
        ServiceError::Database { .. } => {
            error!(template_id, user_id, error = %err, "Batch template apply item failed");
            "database error".to_string()
        }
        other => other.to_string(),
    }
}

fn ensure_user_id(user_id: i64) -> ServiceResult<()> {
    if user_id <= 0 {
        return Err(ServiceError::validation("user_id", "user id is required"));
    }
    Ok(())
}

/// Empty means "not set". Anything else must parse as a JSON object.
fn ensure_json_object(field: &'static str, raw: &str) -> ServiceResult<()> {
    if raw.is_empty() {
        return Ok(());
    }
    serde_json::from_str::<Map<String, Value>>(raw)
        .map(|_| ())
        .map_err(|e| ServiceError::validation(field, format!("{} must be a JSON object: {}", field, e)))
}
