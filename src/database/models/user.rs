use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::pagination::PageEntity;

/// Public view of a user row. The password column is never selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub nickname: String,
    pub avatar: String,
    /// 1 active, 0 disabled
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PageEntity for User {
    const TABLE: &'static str = "users";
    const SORTABLE: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "nickname",
        "status",
        "created_at",
        "updated_at",
    ];
    const SEARCHABLE: &'static [&'static str] = &["username", "email", "nickname"];
    const DEFAULT_ORDER: &'static str = "\"created_at\" DESC";
    const SELECT: &'static str = "\"id\", \"username\", \"email\", \"nickname\", \"avatar\", \"status\", \"created_at\", \"updated_at\"";
}

/// Only the fields present in the body are changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub nickname: Option<String>,
    #[validate(length(max = 255))]
    pub avatar: Option<String>,
    #[validate(range(min = 0, max = 1))]
    pub status: Option<i32>,
}

impl User {
    pub fn apply_update(&mut self, req: UpdateUserRequest) {
        if let Some(username) = req.username {
            self.username = username;
        }
        if let Some(email) = req.email {
            self.email = email;
        }
        if let Some(nickname) = req.nickname {
            self.nickname = nickname;
        }
        if let Some(avatar) = req.avatar {
            self.avatar = avatar;
        }
        if let Some(status) = req.status {
            self.status = status;
        }
    }
}
