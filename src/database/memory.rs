//! In-process repository implementations.
//!
//! They honour the same contracts as the Postgres repositories (allow-list
//! validation, soft delete, unique keys, ordering and paging) and back the
//! service unit tests and the HTTP integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CreateTroveRequest, FieldTemplate, NewFieldTemplate, NewProfileField, NewWeapon, ProfileField,
    TemplateFilter, Trove, User, Weapon,
};
use crate::database::repositories::{
    FieldTemplateRepository, ProfileFieldRepository, TroveRepository, UserRepository,
    WeaponRepository,
};
use crate::pagination::{Condition, PageEntity, PageRequest, SortOrder};

pub trait MemoryRecord: PageEntity + Serialize + Clone + Send + Sync {
    fn id(&self) -> i64;
}

macro_rules! memory_record {
    ($($ty:ty),*) => {
        $(impl MemoryRecord for $ty {
            fn id(&self) -> i64 {
                self.id
            }
        })*
    };
}

memory_record!(User, Weapon, Trove, FieldTemplate, ProfileField);

struct Stored<T> {
    record: T,
    deleted: bool,
}

struct Table<T> {
    next_id: i64,
    rows: Vec<Stored<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { next_id: 1, rows: Vec::new() }
    }
}

impl<T: MemoryRecord> Table<T> {
    fn live(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().filter(|s| !s.deleted).map(|s| &s.record)
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.live().find(|r| pred(*r)).cloned()
    }

    fn get(&self, id: i64) -> Option<T> {
        self.find(|r| r.id() == id)
    }

    fn insert(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let record = build(self.next_id);
        self.next_id += 1;
        self.rows.push(Stored { record: record.clone(), deleted: false });
        record
    }

    fn replace(&mut self, record: T) -> Option<T> {
        let stored = self
            .rows
            .iter_mut()
            .find(|s| !s.deleted && s.record.id() == record.id())?;
        stored.record = record.clone();
        Some(record)
    }

    fn soft_delete(&mut self, id: i64) -> bool {
        match self.rows.iter_mut().find(|s| !s.deleted && s.record.id() == id) {
            Some(stored) => {
                stored.deleted = true;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: i64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|s| s.deleted || s.record.id() != id);
        self.rows.len() != before
    }

    fn page(&self, page: &PageRequest, filters: &[Condition]) -> Result<(Vec<T>, i64), DatabaseError> {
        let sort_column = page.resolve_sort_field(T::SORTABLE)?;
        let search_column = page.resolve_search_field(T::SEARCHABLE)?;

        let mut rows = Vec::new();
        for record in self.live() {
            let value = serde_json::to_value(record)
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
            rows.push((record, value));
        }

        rows.retain(|(_, value)| filters.iter().all(|c| value.get(c.column) == Some(&c.value)));

        if page.has_search() {
            let needle = page.keyword().to_lowercase();
            let columns = match search_column {
                Some(column) => vec![column],
                None => T::SEARCHABLE.to_vec(),
            };
            rows.retain(|(_, value)| {
                columns.iter().any(|column| {
                    value
                        .get(*column)
                        .and_then(Value::as_str)
                        .map_or(false, |s| s.to_lowercase().contains(&needle))
                })
            });
        }

        let order = match sort_column {
            Some(column) => vec![(column, page.sort_order)],
            None => parse_order(T::DEFAULT_ORDER),
        };
        let tie_break = order.last().map_or(SortOrder::Asc, |(_, dir)| *dir);
        rows.sort_by(|(a, av), (b, bv)| {
            for (column, dir) in &order {
                let ord = directed(compare_values(av.get(*column), bv.get(*column)), *dir);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            directed(a.id().cmp(&b.id()), tie_break)
        });

        let total = rows.len() as i64;
        let data = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|(record, _)| record.clone())
            .collect();
        Ok((data, total))
    }
}

fn parse_order(raw: &str) -> Vec<(&str, SortOrder)> {
    raw.split(',')
        .filter_map(|term| {
            let mut parts = term.split_whitespace();
            let column = parts.next()?.trim_matches('"');
            let dir = match parts.next() {
                Some(d) if d.eq_ignore_ascii_case("desc") => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            Some((column, dir))
        })
        .collect()
}

fn directed(ord: Ordering, dir: SortOrder) -> Ordering {
    match dir {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn unique_violation(constraint: &str) -> DatabaseError {
    DatabaseError::UniqueViolation(Some(constraint.to_string()))
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// There is no create endpoint for users, so tests seed them directly.
    pub async fn seed(&self, username: &str, email: &str, nickname: &str) -> User {
        let now = Utc::now();
        self.table.write().await.insert(|id| User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            nickname: nickname.to_string(),
            avatar: String::new(),
            status: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.table.read().await.get(id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.table.read().await.find(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.table.read().await.find(|u| u.email == email))
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        self.table.read().await.page(page, &[])
    }

    async fn update(&self, user: &User) -> Result<User, DatabaseError> {
        let mut table = self.table.write().await;
        if table.find(|u| u.username == user.username && u.id != user.id).is_some() {
            return Err(unique_violation("users_username_key"));
        }
        if table.find(|u| u.email == user.email && u.id != user.id).is_some() {
            return Err(unique_violation("users_email_key"));
        }
        let updated = User { updated_at: Utc::now(), ..user.clone() };
        table
            .replace(updated)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.write().await.soft_delete(id))
    }
}

#[derive(Default)]
pub struct MemoryWeaponRepository {
    table: RwLock<Table<Weapon>>,
}

impl MemoryWeaponRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeaponRepository for MemoryWeaponRepository {
    async fn create(&self, weapon: &NewWeapon) -> Result<Weapon, DatabaseError> {
        let mut table = self.table.write().await;
        if table.find(|w| w.name == weapon.name).is_some() {
            return Err(unique_violation("weapons_name_key"));
        }
        let now = Utc::now();
        Ok(table.insert(|id| Weapon {
            id,
            name: weapon.name.clone(),
            level: weapon.level,
            content: weapon.content.clone(),
            weapon_type: weapon.weapon_type,
            story: weapon.story.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Weapon>, DatabaseError> {
        Ok(self.table.read().await.get(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Weapon>, DatabaseError> {
        Ok(self.table.read().await.find(|w| w.name == name))
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Weapon>, i64), DatabaseError> {
        self.table.read().await.page(page, &[])
    }

    async fn update(&self, weapon: &Weapon) -> Result<Weapon, DatabaseError> {
        let mut table = self.table.write().await;
        if table.find(|w| w.name == weapon.name && w.id != weapon.id).is_some() {
            return Err(unique_violation("weapons_name_key"));
        }
        let updated = Weapon { updated_at: Utc::now(), ..weapon.clone() };
        table
            .replace(updated)
            .ok_or_else(|| DatabaseError::NotFound(format!("weapon {}", weapon.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.write().await.soft_delete(id))
    }
}

#[derive(Default)]
pub struct MemoryTroveRepository {
    table: RwLock<Table<Trove>>,
}

impl MemoryTroveRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TroveRepository for MemoryTroveRepository {
    async fn create(&self, trove: &CreateTroveRequest) -> Result<Trove, DatabaseError> {
        let now = Utc::now();
        Ok(self.table.write().await.insert(|id| Trove {
            id,
            title: trove.title.clone(),
            description: trove.description.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Trove>, DatabaseError> {
        Ok(self.table.read().await.get(id))
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<Trove>, i64), DatabaseError> {
        self.table.read().await.page(page, &[])
    }

    async fn update(&self, trove: &Trove) -> Result<Trove, DatabaseError> {
        let updated = Trove { updated_at: Utc::now(), ..trove.clone() };
        self.table
            .write()
            .await
            .replace(updated)
            .ok_or_else(|| DatabaseError::NotFound(format!("trove {}", trove.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.write().await.soft_delete(id))
    }
}

#[derive(Default)]
pub struct MemoryFieldTemplateRepository {
    table: RwLock<Table<FieldTemplate>>,
}

impl MemoryFieldTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FieldTemplateRepository for MemoryFieldTemplateRepository {
    async fn create(&self, t: &NewFieldTemplate) -> Result<FieldTemplate, DatabaseError> {
        let mut table = self.table.write().await;
        if table.find(|existing| existing.field_key == t.field_key).is_some() {
            return Err(unique_violation("profile_field_templates_field_key_key"));
        }
        let now = Utc::now();
        Ok(table.insert(|id| FieldTemplate {
            id,
            field_key: t.field_key.clone(),
            field_name: t.field_name.clone(),
            field_type: t.field_type.clone(),
            is_required: t.is_required,
            is_searchable: t.is_searchable,
            is_public: t.is_public,
            default_value: t.default_value.clone(),
            options: t.options.clone(),
            validation: t.validation.clone(),
            display_order: t.display_order,
            icon: t.icon.clone(),
            description: t.description.clone(),
            default_unlock_rules: t.default_unlock_rules.clone(),
            category: t.category.clone(),
            is_active: t.is_active,
            create_time: now,
            update_time: now,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FieldTemplate>, DatabaseError> {
        Ok(self.table.read().await.get(id))
    }

    async fn find_by_key(&self, field_key: &str) -> Result<Option<FieldTemplate>, DatabaseError> {
        Ok(self.table.read().await.find(|t| t.field_key == field_key))
    }

    async fn list(
        &self,
        filter: &TemplateFilter,
        page: &PageRequest,
    ) -> Result<(Vec<FieldTemplate>, i64), DatabaseError> {
        self.table.read().await.page(page, &filter.conditions())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<FieldTemplate>, DatabaseError> {
        let table = self.table.read().await;
        let mut rows: Vec<FieldTemplate> = table
            .live()
            .filter(|t| t.category == category && t.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.display_order, t.id));
        Ok(rows)
    }

    async fn update(&self, t: &FieldTemplate) -> Result<FieldTemplate, DatabaseError> {
        let mut table = self.table.write().await;
        // field_key is immutable; keep whatever is stored
        let stored = table
            .get(t.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("field template {}", t.id)))?;
        let updated = FieldTemplate {
            field_key: stored.field_key,
            create_time: stored.create_time,
            update_time: Utc::now(),
            ..t.clone()
        };
        table
            .replace(updated)
            .ok_or_else(|| DatabaseError::NotFound(format!("field template {}", t.id)))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.write().await.soft_delete(id))
    }
}

#[derive(Default)]
pub struct MemoryProfileFieldRepository {
    table: RwLock<Table<ProfileField>>,
}

impl MemoryProfileFieldRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileFieldRepository for MemoryProfileFieldRepository {
    async fn create(&self, f: &NewProfileField) -> Result<ProfileField, DatabaseError> {
        let mut table = self.table.write().await;
        if table
            .find(|existing| existing.user_id == f.user_id && existing.field_key == f.field_key)
            .is_some()
        {
            return Err(unique_violation("profile_fields_user_field_key"));
        }
        let now = Utc::now();
        Ok(table.insert(|id| ProfileField {
            id,
            user_id: f.user_id,
            field_key: f.field_key.clone(),
            field_name: f.field_name.clone(),
            field_type: f.field_type.clone(),
            is_system: f.is_system,
            is_required: f.is_required,
            is_searchable: f.is_searchable,
            is_public: f.is_public,
            default_value: f.default_value.clone(),
            options: f.options.clone(),
            validation: f.validation.clone(),
            display_order: f.display_order,
            icon: f.icon.clone(),
            description: f.description.clone(),
            create_time: now,
            update_time: now,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProfileField>, DatabaseError> {
        Ok(self.table.read().await.get(id))
    }

    async fn find_by_user_and_key(
        &self,
        user_id: i64,
        field_key: &str,
    ) -> Result<Option<ProfileField>, DatabaseError> {
        Ok(self
            .table
            .read()
            .await
            .find(|f| f.user_id == user_id && f.field_key == field_key))
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<ProfileField>, i64), DatabaseError> {
        self.table
            .read()
            .await
            .page(page, &[Condition::eq("user_id", user_id)])
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.write().await.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageError;

    #[tokio::test]
    async fn pages_with_default_order_and_search() {
        let repo = MemoryUserRepository::new();
        for i in 1..=25 {
            repo.seed(&format!("user{i:02}"), &format!("u{i}@example.com"), "Nick").await;
        }
        repo.seed("john", "john@example.com", "Johnny").await;

        let (data, total) = repo.list(&PageRequest::new(3, 10)).await.unwrap();
        assert_eq!(total, 26);
        assert_eq!(data.len(), 6);
        // created_at DESC falls back to newest id first
        assert_eq!(data.last().unwrap().id, 1);

        let search = PageRequest::default().with_search("JOHN", Some("username"));
        let (data, total) = repo.list(&search).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(data[0].username, "john");
    }

    #[tokio::test]
    async fn keyword_underscore_is_not_a_wildcard() {
        let repo = MemoryUserRepository::new();
        repo.seed("a_c", "a_c@example.com", "").await;
        repo.seed("abc", "abc@example.com", "").await;

        let search = PageRequest::default().with_search("a_c", Some("username"));
        let (data, total) = repo.list(&search).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(data[0].username, "a_c");
    }

    #[tokio::test]
    async fn user_update_enforces_live_uniqueness() {
        let repo = MemoryUserRepository::new();
        let alice = repo.seed("alice", "a@example.com", "").await;
        let bob = repo.seed("bob", "b@example.com", "").await;

        let taken = User { username: "bob".into(), ..alice.clone() };
        let err = repo.update(&taken).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(Some(ref c)) if c == "users_username_key"));

        let taken = User { email: "b@example.com".into(), ..alice.clone() };
        let err = repo.update(&taken).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(Some(ref c)) if c == "users_email_key"));

        assert!(repo.soft_delete(bob.id).await.unwrap());
        let renamed = repo.update(&User { username: "bob".into(), ..alice }).await.unwrap();
        assert_eq!(renamed.username, "bob");
        assert!(matches!(repo.update(&bob).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn sort_and_search_fields_are_allow_listed() {
        let repo = MemoryUserRepository::new();
        let bad = PageRequest::default().with_sort("password", SortOrder::Asc);
        let err = repo.list(&bad).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Page(PageError::InvalidSortField(ref f)) if f == "password"));
    }

    #[tokio::test]
    async fn sorts_by_requested_column() {
        let repo = MemoryUserRepository::new();
        repo.seed("bob", "b@example.com", "").await;
        repo.seed("alice", "a@example.com", "").await;
        repo.seed("carol", "c@example.com", "").await;

        let page = PageRequest::default().with_sort("username", SortOrder::Asc);
        let (data, _) = repo.list(&page).await.unwrap();
        let names: Vec<&str> = data.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn soft_deleted_rows_disappear() {
        let repo = MemoryWeaponRepository::new();
        let new = NewWeapon {
            name: "AK47".into(),
            level: 1,
            content: String::new(),
            weapon_type: 1,
            story: String::new(),
        };
        let w = repo.create(&new).await.unwrap();
        assert!(repo.create(&new).await.unwrap_err().is_unique_violation());
        assert!(repo.soft_delete(w.id).await.unwrap());
        assert!(!repo.soft_delete(w.id).await.unwrap());
        assert!(repo.find_by_id(w.id).await.unwrap().is_none());
        // the name is free again once the row is deleted
        assert!(repo.create(&new).await.is_ok());
    }
}
