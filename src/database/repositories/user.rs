use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::query_builder::fetch_page;
use crate::pagination::{PageEntity, PageQuery, PageRequest};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn list(&self, page: &PageRequest) -> Result<(Vec<User>, i64), DatabaseError>;
    async fn update(&self, user: &User) -> Result<User, DatabaseError>;
    /// Returns false when no live row had this id.
    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_live_by(&self, column: &str, value: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM \"users\" WHERE \"{}\" = $1 AND \"deleted_at\" IS NULL",
            User::SELECT,
            column
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM \"users\" WHERE \"id\" = $1 AND \"deleted_at\" IS NULL",
            User::SELECT
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        self.find_live_by("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.find_live_by("email", email).await
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let query = PageQuery::build::<User>(page, vec![])?;
        fetch_page(&self.pool, &query).await
    }

    async fn update(&self, user: &User) -> Result<User, DatabaseError> {
        let sql = format!(
            r#"UPDATE "users"
               SET "username" = $2, "email" = $3, "nickname" = $4, "avatar" = $5, "status" = $6, "updated_at" = NOW()
               WHERE "id" = $1 AND "deleted_at" IS NULL
               RETURNING {}"#,
            User::SELECT
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.nickname)
            .bind(&user.avatar)
            .bind(user.status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
