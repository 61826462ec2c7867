use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewWeapon, Weapon};
use crate::database::query_builder::fetch_page;
use crate::pagination::{PageQuery, PageRequest};

#[async_trait]
pub trait WeaponRepository: Send + Sync {
    async fn create(&self, weapon: &NewWeapon) -> Result<Weapon, DatabaseError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Weapon>, DatabaseError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Weapon>, DatabaseError>;
    async fn list(&self, page: &PageRequest) -> Result<(Vec<Weapon>, i64), DatabaseError>;
    async fn update(&self, weapon: &Weapon) -> Result<Weapon, DatabaseError>;
    /// Returns false when no live row had this id.
    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

pub struct PgWeaponRepository {
    pool: PgPool,
}

impl PgWeaponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeaponRepository for PgWeaponRepository {
    async fn create(&self, weapon: &NewWeapon) -> Result<Weapon, DatabaseError> {
        let row = sqlx::query_as::<_, Weapon>(
            r#"INSERT INTO weapons (name, level, content, weapon_type, story)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(&weapon.name)
        .bind(weapon.level)
        .bind(&weapon.content)
        .bind(weapon.weapon_type)
        .bind(&weapon.story)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Weapon>, DatabaseError> {
        let row = sqlx::query_as::<_, Weapon>(
            "SELECT * FROM weapons WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Weapon>, DatabaseError> {
        let row = sqlx::query_as::<_, Weapon>(
            "SELECT * FROM weapons WHERE name = $1 AND deleted_at IS NULL",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Weapon>, i64), DatabaseError> {
        let query = PageQuery::build::<Weapon>(page, vec![])?;
        fetch_page(&self.pool, &query).await
    }

    async fn update(&self, weapon: &Weapon) -> Result<Weapon, DatabaseError> {
        sqlx::query_as::<_, Weapon>(
            r#"UPDATE weapons
               SET name = $2, level = $3, content = $4, weapon_type = $5, story = $6, updated_at = NOW()
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(weapon.id)
        .bind(&weapon.name)
        .bind(weapon.level)
        .bind(&weapon.content)
        .bind(weapon.weapon_type)
        .bind(&weapon.story)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("weapon {}", weapon.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE weapons SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
