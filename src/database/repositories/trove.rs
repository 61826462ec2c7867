use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{CreateTroveRequest, Trove};
use crate::database::query_builder::fetch_page;
use crate::pagination::{PageQuery, PageRequest};

#[async_trait]
pub trait TroveRepository: Send + Sync {
    async fn create(&self, trove: &CreateTroveRequest) -> Result<Trove, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Trove>, DatabaseError>;
    async fn list(&self, page: &PageRequest) -> Result<(Vec<Trove>, i64), DatabaseError>;
    async fn update(&self, trove: &Trove) -> Result<Trove, DatabaseError>;
    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

pub struct PgTroveRepository {
    pool: PgPool,
}

impl PgTroveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TroveRepository for PgTroveRepository {
    async fn create(&self, trove: &CreateTroveRequest) -> Result<Trove, DatabaseError> {
        let row = sqlx::query_as::<_, Trove>(
            "INSERT INTO troves (title, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&trove.title)
        .bind(&trove.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Trove>, DatabaseError> {
        let row = sqlx::query_as::<_, Trove>(
            "SELECT * FROM troves WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Trove>, i64), DatabaseError> {
        let query = PageQuery::build::<Trove>(page, vec![])?;
        fetch_page(&self.pool, &query).await
    }

    async fn update(&self, trove: &Trove) -> Result<Trove, DatabaseError> {
        sqlx::query_as::<_, Trove>(
            r#"UPDATE troves SET title = $2, description = $3, updated_at = NOW()
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(trove.id)
        .bind(&trove.title)
        .bind(&trove.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("trove {}", trove.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE troves SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
