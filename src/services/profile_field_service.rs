use std::sync::Arc;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::ProfileField;
use crate::database::repositories::ProfileFieldRepository;
use crate::pagination::{PageRequest, PageResponse};

pub struct ProfileFieldService {
    fields: Arc<dyn ProfileFieldRepository>,
}

impl ProfileFieldService {
    pub fn new(fields: Arc<dyn ProfileFieldRepository>) -> Self {
        Self { fields }
    }

    pub async fn list_user_fields(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> ServiceResult<PageResponse<ProfileField>> {
        let (fields, total) = self
            .fields
            .list_by_user(user_id, page)
            .await
            .map_err(ServiceError::db("list profile fields"))?;
        Ok(PageResponse::new(fields, total, page.page, page.page_size))
    }

    pub async fn get_field(&self, id: i64) -> ServiceResult<ProfileField> {
        self.fields
            .find_by_id(id)
            .await
            .map_err(ServiceError::db("find profile field"))?
            .ok_or_else(|| ServiceError::not_found("profile field not found"))
    }

    pub async fn delete_field(&self, id: i64) -> ServiceResult<()> {
        let deleted = self
            .fields
            .delete(id)
            .await
            .map_err(ServiceError::db("delete profile field"))?;
        if !deleted {
            return Err(ServiceError::not_found("profile field not found"));
        }
        info!(field_id = id, "Profile field deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryProfileFieldRepository;
    use crate::database::models::NewProfileField;
    use crate::pagination::SortOrder;

    fn field(user_id: i64, key: &str, display_order: i32) -> NewProfileField {
        NewProfileField {
            user_id,
            field_key: key.to_string(),
            field_name: key.to_uppercase(),
            field_type: "TEXT".to_string(),
            is_system: true,
            is_required: false,
            is_searchable: false,
            is_public: true,
            default_value: String::new(),
            options: String::new(),
            validation: String::new(),
            display_order,
            icon: String::new(),
            description: String::new(),
        }
    }

    async fn seeded() -> ProfileFieldService {
        let repo = Arc::new(MemoryProfileFieldRepository::new());
        repo.create(&field(1, "height", 30)).await.unwrap();
        repo.create(&field(1, "education", 10)).await.unwrap();
        repo.create(&field(1, "hobby", 20)).await.unwrap();
        repo.create(&field(2, "education", 10)).await.unwrap();
        ProfileFieldService::new(repo)
    }

    #[tokio::test]
    async fn lists_only_the_users_fields_in_display_order() {
        let svc = seeded().await;
        let page = svc.list_user_fields(1, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 3);
        let keys: Vec<&str> = page.data.iter().map(|f| f.field_key.as_str()).collect();
        assert_eq!(keys, vec!["education", "hobby", "height"]);
        assert!(page.data.iter().all(|f| f.user_id == 1));
    }

    #[tokio::test]
    async fn sorts_and_pages() {
        let svc = seeded().await;
        let req = PageRequest::new(2, 2).with_sort("field_key", SortOrder::Desc);
        let page = svc.list_user_fields(1, &req).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);
        assert!(page.has_prev);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].field_key, "education");
    }

    #[tokio::test]
    async fn delete_is_hard_and_reports_missing() {
        let svc = seeded().await;
        svc.delete_field(1).await.unwrap();
        assert!(matches!(svc.get_field(1).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_field(1).await, Err(ServiceError::NotFound(_))));
    }
}
