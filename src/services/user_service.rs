use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{UpdateUserRequest, User};
use crate::database::repositories::UserRepository;
use crate::database::DatabaseError;
use crate::pagination::{PageRequest, PageResponse};

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn list_users(&self, page: &PageRequest) -> ServiceResult<PageResponse<User>> {
        let (users, total) = self
            .users
            .list(page)
            .await
            .map_err(ServiceError::db("list users"))?;
        Ok(PageResponse::new(users, total, page.page, page.page_size))
    }

    pub async fn get_user(&self, id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await
            .map_err(ServiceError::db("find user"))?
            .ok_or_else(user_not_found)
    }

    /// Username and email stay unique among live users; a user may keep its own.
    pub async fn update_user(&self, id: i64, req: UpdateUserRequest) -> ServiceResult<User> {
        req.validate()?;
        let mut user = self.get_user(id).await?;

        if let Some(username) = req.username.as_deref() {
            let existing = self
                .users
                .find_by_username(username)
                .await
                .map_err(ServiceError::db("find user"))?;
            ensure_free(existing, id, "username", username)?;
        }
        if let Some(email) = req.email.as_deref() {
            let existing = self
                .users
                .find_by_email(email)
                .await
                .map_err(ServiceError::db("find user"))?;
            ensure_free(existing, id, "email", email)?;
        }

        user.apply_update(req);
        let user = self
            .users
            .update(&user)
            .await
            .map_err(map_write_error("update user"))?;
        info!(user_id = id, "User updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: i64) -> ServiceResult<()> {
        let deleted = self
            .users
            .soft_delete(id)
            .await
            .map_err(ServiceError::db("delete user"))?;
        if !deleted {
            return Err(user_not_found());
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}

fn ensure_free(existing: Option<User>, own_id: i64, what: &str, value: &str) -> ServiceResult<()> {
    match existing {
        Some(u) if u.id != own_id => Err(ServiceError::conflict(
            format!("{} already exists: {}", what, value),
            Some(u.id),
        )),
        _ => Ok(()),
    }
}

fn user_not_found() -> ServiceError {
    ServiceError::not_found("user not found")
}

fn map_write_error(operation: &'static str) -> impl FnOnce(DatabaseError) -> ServiceError {
    move |err| match err {
        DatabaseError::UniqueViolation(Some(ref constraint)) if constraint == "users_email_key" => {
            ServiceError::conflict("email already exists", None)
        }
        DatabaseError::UniqueViolation(_) => ServiceError::conflict("username already exists", None),
        DatabaseError::NotFound(_) => user_not_found(),
        other => ServiceError::db(operation)(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryUserRepository;
    use crate::pagination::{PageParams, SortOrder};

    async fn service_with(n: usize) -> UserService {
        let repo = Arc::new(MemoryUserRepository::new());
        for i in 0..n {
            repo.seed(&format!("user{i}"), &format!("user{i}@example.com"), "").await;
        }
        UserService::new(repo)
    }

    #[tokio::test]
    async fn pagination_metadata_matches_totals() {
        let svc = service_with(25).await;
        let page = svc.list_users(&PageRequest::new(3, 10)).await.unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 5);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[tokio::test]
    async fn oversized_page_size_is_clamped() {
        let svc = service_with(120).await;
        let params = PageParams { page_size: Some("500".into()), ..Default::default() };
        let page = svc.list_users(&PageRequest::from_params(params)).await.unwrap();
        assert_eq!(page.page_size, 100);
        assert_eq!(page.data.len(), 100);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn invalid_sort_field_is_a_page_error() {
        let svc = service_with(1).await;
        let req = PageRequest::default().with_sort("password", SortOrder::Asc);
        let err = svc.list_users(&req).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid sort field: password");
    }

    #[tokio::test]
    async fn missing_user() {
        let svc = service_with(1).await;
        assert_eq!(svc.get_user(1).await.unwrap().username, "user0");
        let err = svc.get_user(99).await.unwrap_err();
        assert_eq!(err.to_string(), "user not found");
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let svc = service_with(1).await;
        let req = UpdateUserRequest { nickname: Some("Zero".into()), status: Some(0), ..Default::default() };
        let user = svc.update_user(1, req).await.unwrap();
        assert_eq!(user.nickname, "Zero");
        assert_eq!(user.status, 0);
        assert_eq!(user.username, "user0");
        assert_eq!(user.email, "user0@example.com");
        assert_eq!(svc.get_user(1).await.unwrap().nickname, "Zero");
    }

    #[tokio::test]
    async fn keeping_own_username_and_email_is_not_a_conflict() {
        let svc = service_with(2).await;
        let req = UpdateUserRequest {
            username: Some("user0".into()),
            email: Some("user0@example.com".into()),
            ..Default::default()
        };
        assert!(svc.update_user(1, req).await.is_ok());
    }

    #[tokio::test]
    async fn taking_another_users_username_or_email_conflicts() {
        let svc = service_with(2).await;

        let req = UpdateUserRequest { username: Some("user1".into()), ..Default::default() };
        let err = svc.update_user(1, req).await.unwrap_err();
        assert_eq!(err.to_string(), "username already exists: user1");
        assert!(matches!(err, ServiceError::Conflict { existing_id: Some(2), .. }));

        let req = UpdateUserRequest { email: Some("user1@example.com".into()), ..Default::default() };
        let err = svc.update_user(1, req).await.unwrap_err();
        assert_eq!(err.to_string(), "email already exists: user1@example.com");

        // nothing was written
        assert_eq!(svc.get_user(1).await.unwrap().username, "user0");
    }

    #[tokio::test]
    async fn deleted_users_free_their_username() {
        let svc = service_with(2).await;
        svc.delete_user(2).await.unwrap();
        assert!(matches!(svc.get_user(2).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_user(2).await, Err(ServiceError::NotFound(_))));
        assert_eq!(svc.list_users(&PageRequest::default()).await.unwrap().total, 1);

        let req = UpdateUserRequest { username: Some("user1".into()), ..Default::default() };
        assert_eq!(svc.update_user(1, req).await.unwrap().username, "user1");
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found() {
        let svc = service_with(1).await;
        let err = svc.update_user(42, UpdateUserRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let svc = service_with(1).await;
        let req = UpdateUserRequest { email: Some("nope".into()), ..Default::default() };
        assert!(matches!(
            svc.update_user(1, req).await,
            Err(ServiceError::InvalidRequest(_))
        ));
    }
}
