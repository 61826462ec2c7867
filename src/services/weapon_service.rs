use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{CreateWeaponRequest, NewWeapon, UpdateWeaponRequest, Weapon};
use crate::database::repositories::WeaponRepository;
use crate::database::DatabaseError;
use crate::pagination::{PageRequest, PageResponse};

pub struct WeaponService {
    weapons: Arc<dyn WeaponRepository>,
}

impl WeaponService {
    pub fn new(weapons: Arc<dyn WeaponRepository>) -> Self {
        Self { weapons }
    }

    pub async fn create(&self, req: CreateWeaponRequest) -> ServiceResult<Weapon> {
        req.validate()?;
        self.ensure_name_free(&req.name, None).await?;

        let weapon = self
            .weapons
            .create(&NewWeapon::from(req))
            .await
            .map_err(map_write_error("create weapon"))?;
        info!(weapon_id = weapon.id, "Weapon created");
        Ok(weapon)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Weapon> {
        self.weapons
            .find_by_id(id)
            .await
            .map_err(ServiceError::db("find weapon"))?
            .ok_or_else(weapon_not_found)
    }

    pub async fn list(&self, page: &PageRequest) -> ServiceResult<PageResponse<Weapon>> {
        let (weapons, total) = self
            .weapons
            .list(page)
            .await
            .map_err(ServiceError::db("list weapons"))?;
        Ok(PageResponse::new(weapons, total, page.page, page.page_size))
    }

    pub async fn update(&self, id: i64, req: UpdateWeaponRequest) -> ServiceResult<Weapon> {
        req.validate()?;
        let mut weapon = self.get(id).await?;
        if let Some(name) = req.name.as_deref() {
            self.ensure_name_free(name, Some(id)).await?;
        }

        weapon.apply_update(req);
        let weapon = self
            .weapons
            .update(&weapon)
            .await
            .map_err(map_write_error("update weapon"))?;
        info!(weapon_id = id, "Weapon updated");
        Ok(weapon)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let deleted = self
            .weapons
            .soft_delete(id)
            .await
            .map_err(ServiceError::db("delete weapon"))?;
        if !deleted {
            return Err(weapon_not_found());
        }
        info!(weapon_id = id, "Weapon deleted");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, own_id: Option<i64>) -> ServiceResult<()> {
        let existing = self
            .weapons
            .find_by_name(name)
            .await
            .map_err(ServiceError::db("find weapon"))?;
        match existing {
            Some(w) if Some(w.id) != own_id => Err(ServiceError::conflict(
                format!("weapon name already exists: {}", name),
                Some(w.id),
            )),
            _ => Ok(()),
        }
    }
}

fn weapon_not_found() -> ServiceError {
    ServiceError::not_found("weapon not found")
}

fn map_write_error(operation: &'static str) -> impl FnOnce(DatabaseError) -> ServiceError {
    move |err| match err {
        DatabaseError::UniqueViolation(_) => ServiceError::conflict("weapon name already exists", None),
        DatabaseError::NotFound(_) => weapon_not_found(),
        other => ServiceError::db(operation)(other),
    }
}
