use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{CreateTroveRequest, Trove, UpdateTroveRequest};
use crate::database::repositories::TroveRepository;
use crate::database::DatabaseError;
use crate::pagination::{PageRequest, PageResponse};

pub struct TroveService {
    troves: Arc<dyn TroveRepository>,
}

impl TroveService {
    pub fn new(troves: Arc<dyn TroveRepository>) -> Self {
        Self { troves }
    }

    pub async fn create(&self, req: CreateTroveRequest) -> ServiceResult<Trove> {
        req.validate()?;
        let trove = self
            .troves
            .create(&req)
            .await
            .map_err(ServiceError::db("create trove"))?;
        info!(trove_id = trove.id, "Trove created");
        Ok(trove)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Trove> {
        self.troves
            .find_by_id(id)
            .await
            .map_err(ServiceError::db("find trove"))?
            .ok_or_else(trove_not_found)
    }

    pub async fn list(&self, page: &PageRequest) -> ServiceResult<PageResponse<Trove>> {
        let (troves, total) = self
            .troves
            .list(page)
            .await
            .map_err(ServiceError::db("list troves"))?;
        Ok(PageResponse::new(troves, total, page.page, page.page_size))
    }

    pub async fn update(&self, id: i64, req: UpdateTroveRequest) -> ServiceResult<Trove> {
        req.validate()?;
        let mut trove = self.get(id).await?;
        trove.apply_update(req);
        let trove = self.troves.update(&trove).await.map_err(|err| match err {
            DatabaseError::NotFound(_) => trove_not_found(),
            other => ServiceError::db("update trove")(other),
        })?;
        info!(trove_id = id, "Trove updated");
        Ok(trove)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self
            .troves
            .soft_delete(id)
            .await
            .map_err(ServiceError::db("delete trove"))?
        {
            return Err(trove_not_found());
        }
        info!(trove_id = id, "Trove deleted");
        Ok(())
    }
}

fn trove_not_found() -> ServiceError {
    ServiceError::not_found("trove not found")
}
