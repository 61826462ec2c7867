use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::pagination::PageEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Weapon {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub content: String,
    #[serde(rename = "type")]
    pub weapon_type: i32,
    pub story: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PageEntity for Weapon {
    const TABLE: &'static str = "weapons";
    const SORTABLE: &'static [&'static str] = &["id", "name", "level", "created_at"];
    const SEARCHABLE: &'static [&'static str] = &["name"];
    const DEFAULT_ORDER: &'static str = "\"created_at\" DESC";
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWeaponRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub level: Option<i32>,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub weapon_type: Option<i32>,
    #[serde(default)]
    pub story: String,
}

/// Only the fields present in the body are changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateWeaponRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub level: Option<i32>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub weapon_type: Option<i32>,
    pub story: Option<String>,
}

/// Insert shape for a weapon row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeapon {
    pub name: String,
    pub level: i32,
    pub content: String,
    pub weapon_type: i32,
    pub story: String,
}

impl From<CreateWeaponRequest> for NewWeapon {
    fn from(req: CreateWeaponRequest) -> Self {
        Self {
            name: req.name,
            level: req.level.unwrap_or(1),
            content: req.content,
            weapon_type: req.weapon_type.unwrap_or(1),
            story: req.story,
        }
    }
}

impl Weapon {
    pub fn apply_update(&mut self, req: UpdateWeaponRequest) {
        if let Some(name) = req.name {
            self.name = name;
        }
        if let Some(level) = req.level {
            self.level = level;
        }
        if let Some(content) = req.content {
            self.content = content;
        }
        if let Some(weapon_type) = req.weapon_type {
            self.weapon_type = weapon_type;
        }
        if let Some(story) = req.story {
            self.story = story;
        }
    }
}
