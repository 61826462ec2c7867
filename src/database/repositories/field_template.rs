use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{FieldTemplate, NewFieldTemplate, TemplateFilter};
use crate::database::query_builder::fetch_page;
use crate::pagination::{PageQuery, PageRequest};

/// Persistence for profile field templates. Soft-deleted rows are invisible
/// to every method.
#[async_trait]
pub trait FieldTemplateRepository: Send + Sync {
    /// Fails with [`DatabaseError::UniqueViolation`] when a live template
    /// already uses the key.
    async fn create(&self, template: &NewFieldTemplate) -> Result<FieldTemplate, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<FieldTemplate>, DatabaseError>;
    async fn find_by_key(&self, field_key: &str) -> Result<Option<FieldTemplate>, DatabaseError>;
    async fn list(
        &self,
        filter: &TemplateFilter,
        page: &PageRequest,
    ) -> Result<(Vec<FieldTemplate>, i64), DatabaseError>;
    /// Active templates of one category in display order.
    async fn list_by_category(&self, category: &str) -> Result<Vec<FieldTemplate>, DatabaseError>;
    async fn update(&self, template: &FieldTemplate) -> Result<FieldTemplate, DatabaseError>;
    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

pub struct PgFieldTemplateRepository {
    pool: PgPool,
}

impl PgFieldTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FieldTemplateRepository for PgFieldTemplateRepository {
    async fn create(&self, t: &NewFieldTemplate) -> Result<FieldTemplate, DatabaseError> {
        let row = sqlx::query_as::<_, FieldTemplate>(
            r#"INSERT INTO profile_field_templates (
                   field_key, field_name, field_type, is_required, is_searchable, is_public,
                   default_value, options, validation, display_order, icon, description,
                   default_unlock_rules, category, is_active
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
               RETURNING *"#,
        )
        .bind(&t.field_key)
        .bind(&t.field_name)
        .bind(&t.field_type)
        .bind(t.is_required)
        .bind(t.is_searchable)
        .bind(t.is_public)
        .bind(&t.default_value)
        .bind(&t.options)
        .bind(&t.validation)
        .bind(t.display_order)
        .bind(&t.icon)
        .bind(&t.description)
        .bind(&t.default_unlock_rules)
        .bind(&t.category)
        .bind(t.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FieldTemplate>, DatabaseError> {
        let row = sqlx::query_as::<_, FieldTemplate>(
            "SELECT * FROM profile_field_templates WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_key(&self, field_key: &str) -> Result<Option<FieldTemplate>, DatabaseError> {
        let row = sqlx::query_as::<_, FieldTemplate>(
            "SELECT * FROM profile_field_templates WHERE field_key = $1 AND deleted_at IS NULL",
        )
        .bind(field_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(
        &self,
        filter: &TemplateFilter,
        page: &PageRequest,
    ) -> Result<(Vec<FieldTemplate>, i64), DatabaseError> {
        let query = PageQuery::build::<FieldTemplate>(page, filter.conditions())?;
        fetch_page(&self.pool, &query).await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<FieldTemplate>, DatabaseError> {
        let rows = sqlx::query_as::<_, FieldTemplate>(
            r#"SELECT * FROM profile_field_templates
               WHERE category = $1 AND is_active = TRUE AND deleted_at IS NULL
               ORDER BY display_order ASC, id ASC"#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update(&self, t: &FieldTemplate) -> Result<FieldTemplate, DatabaseError> {
        sqlx::query_as::<_, FieldTemplate>(
            r#"UPDATE profile_field_templates
               SET field_name = $2, field_type = $3, is_required = $4, is_searchable = $5,
                   is_public = $6, default_value = $7, options = $8, validation = $9,
                   display_order = $10, icon = $11, description = $12,
                   default_unlock_rules = $13, category = $14, is_active = $15,
                   update_time = NOW()
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(t.id)
        .bind(&t.field_name)
        .bind(&t.field_type)
        .bind(t.is_required)
        .bind(t.is_searchable)
        .bind(t.is_public)
        .bind(&t.default_value)
        .bind(&t.options)
        .bind(&t.validation)
        .bind(t.display_order)
        .bind(&t.icon)
        .bind(&t.description)
        .bind(&t.default_unlock_rules)
        .bind(&t.category)
        .bind(t.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("field template {}", t.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE profile_field_templates SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
