use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::pagination::PageEntity;

/// A field owned by one user, copied from a template at apply time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileField {
    pub id: i64,
    pub user_id: i64,
    pub field_key: String,
    pub field_name: String,
    pub field_type: String,
    pub is_system: bool,
    pub is_required: bool,
    pub is_searchable: bool,
    pub is_public: bool,
    pub default_value: String,
    pub options: String,
    pub validation: String,
    pub display_order: i32,
    pub icon: String,
    pub description: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl PageEntity for ProfileField {
    const TABLE: &'static str = "profile_fields";
    const SORTABLE: &'static [&'static str] = &["id", "field_key", "display_order", "create_time"];
    const SEARCHABLE: &'static [&'static str] = &["field_key", "field_name"];
    const DEFAULT_ORDER: &'static str = "\"display_order\" ASC";
    const SOFT_DELETE: bool = false;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProfileField {
    pub user_id: i64,
    pub field_key: String,
    pub field_name: String,
    pub field_type: String,
    pub is_system: bool,
    pub is_required: bool,
    pub is_searchable: bool,
    pub is_public: bool,
    pub default_value: String,
    pub options: String,
    pub validation: String,
    pub display_order: i32,
    pub icon: String,
    pub description: String,
}
