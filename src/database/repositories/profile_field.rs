use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProfileField, ProfileField};
use crate::database::query_builder::fetch_page;
use crate::pagination::{Condition, PageQuery, PageRequest};

#[async_trait]
pub trait ProfileFieldRepository: Send + Sync {
    /// Fails with [`DatabaseError::UniqueViolation`] when the user already has
    /// a field with this key.
    async fn create(&self, field: &NewProfileField) -> Result<ProfileField, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ProfileField>, DatabaseError>;
    async fn find_by_user_and_key(
        &self,
        user_id: i64,
        field_key: &str,
    ) -> Result<Option<ProfileField>, DatabaseError>;
    async fn list_by_user(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<ProfileField>, i64), DatabaseError>;
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

pub struct PgProfileFieldRepository {
    pool: PgPool,
}

impl PgProfileFieldRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileFieldRepository for PgProfileFieldRepository {
    async fn create(&self, f: &NewProfileField) -> Result<ProfileField, DatabaseError> {
        let row = sqlx::query_as::<_, ProfileField>(
            r#"INSERT INTO profile_fields (
                   user_id, field_key, field_name, field_type, is_system, is_required,
                   is_searchable, is_public, default_value, options, validation,
                   display_order, icon, description
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
               RETURNING *"#,
        )
        .bind(f.user_id)
        .bind(&f.field_key)
        .bind(&f.field_name)
        .bind(&f.field_type)
        .bind(f.is_system)
        .bind(f.is_required)
        .bind(f.is_searchable)
        .bind(f.is_public)
        .bind(&f.default_value)
        .bind(&f.options)
        .bind(&f.validation)
        .bind(f.display_order)
        .bind(&f.icon)
        .bind(&f.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProfileField>, DatabaseError> {
        let row = sqlx::query_as::<_, ProfileField>("SELECT * FROM profile_fields WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_user_and_key(
        &self,
        user_id: i64,
        field_key: &str,
    ) -> Result<Option<ProfileField>, DatabaseError> {
        let row = sqlx::query_as::<_, ProfileField>(
            "SELECT * FROM profile_fields WHERE user_id = $1 AND field_key = $2",
        )
        .bind(user_id)
        .bind(field_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<ProfileField>, i64), DatabaseError> {
        let query = PageQuery::build::<ProfileField>(page, vec![Condition::eq("user_id", user_id)])?;
        fetch_page(&self.pool, &query).await
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM profile_fields WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
