use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::pagination::PageEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trove {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PageEntity for Trove {
    const TABLE: &'static str = "troves";
    const SORTABLE: &'static [&'static str] = &["id", "created_at"];
    const SEARCHABLE: &'static [&'static str] = &["title", "description"];
    const DEFAULT_ORDER: &'static str = "\"created_at\" DESC";
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTroveRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTroveRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Trove {
    pub fn apply_update(&mut self, req: UpdateTroveRequest) {
        if let Some(title) = req.title {
            self.title = title;
        }
        if let Some(description) = req.description {
            self.description = description;
        }
    }
}
