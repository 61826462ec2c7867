use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::profile_field::NewProfileField;
use crate::pagination::{Condition, PageEntity};

/// Administrator-defined definition of a profile field. Applying it to a
/// user copies its values into a [`ProfileField`](super::ProfileField).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FieldTemplate {
    pub id: i64,
    pub field_key: String,
    pub field_name: String,
    pub field_type: String,
    pub is_required: bool,
    pub is_searchable: bool,
    pub is_public: bool,
    pub default_value: String,
    /// JSON object text, or empty
    pub options: String,
    /// JSON object text, or empty
    pub validation: String,
    pub display_order: i32,
    pub icon: String,
    pub description: String,
    /// JSON object text, or empty
    pub default_unlock_rules: String,
    pub category: String,
    pub is_active: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl PageEntity for FieldTemplate {
    const TABLE: &'static str = "profile_field_templates";
    const SORTABLE: &'static [&'static str] = &[
        "id",
        "field_key",
        "field_name",
        "category",
        "display_order",
        "create_time",
    ];
    const SEARCHABLE: &'static [&'static str] = &["field_key", "field_name", "description"];
    const DEFAULT_ORDER: &'static str =
        "\"category\" ASC, \"display_order\" ASC, \"create_time\" DESC";
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateFieldTemplateRequest {
    #[validate(length(min = 1, max = 100))]
    pub field_key: String,
    #[validate(length(min = 1, max = 100))]
    pub field_name: String,
    #[validate(length(min = 1))]
    pub field_type: String,
    pub is_required: bool,
    pub is_searchable: bool,
    pub is_public: bool,
    pub default_value: String,
    pub options: String,
    pub validation: String,
    pub display_order: i32,
    #[validate(length(max = 500))]
    pub icon: String,
    #[validate(length(max = 500))]
    pub description: String,
    pub default_unlock_rules: String,
    #[validate(length(max = 50))]
    pub category: String,
}

/// Partial update. Empty strings and absent values leave the stored value alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateFieldTemplateRequest {
    #[validate(length(max = 100))]
    pub field_name: String,
    pub field_type: String,
    pub is_required: Option<bool>,
    pub is_searchable: Option<bool>,
    pub is_public: Option<bool>,
    pub default_value: String,
    pub options: String,
    pub validation: String,
    pub display_order: Option<i32>,
    #[validate(length(max = 500))]
    pub icon: String,
    #[validate(length(max = 500))]
    pub description: String,
    pub default_unlock_rules: String,
    #[validate(length(max = 50))]
    pub category: String,
    pub is_active: Option<bool>,
}

/// Insert shape for a template row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFieldTemplate {
    pub field_key: String,
    pub field_name: String,
    pub field_type: String,
    pub is_required: bool,
    pub is_searchable: bool,
    pub is_public: bool,
    pub default_value: String,
    pub options: String,
    pub validation: String,
    pub display_order: i32,
    pub icon: String,
    pub description: String,
    pub default_unlock_rules: String,
    pub category: String,
    pub is_active: bool,
}

impl From<CreateFieldTemplateRequest> for NewFieldTemplate {
    fn from(req: CreateFieldTemplateRequest) -> Self {
        Self {
            field_key: req.field_key,
            field_name: req.field_name,
            field_type: req.field_type,
            is_required: req.is_required,
            is_searchable: req.is_searchable,
            is_public: req.is_public,
            default_value: req.default_value,
            options: req.options,
            validation: req.validation,
            display_order: req.display_order,
            icon: req.icon,
            description: req.description,
            default_unlock_rules: req.default_unlock_rules,
            category: req.category,
            is_active: true,
        }
    }
}

/// Exact-match filters for the template listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub category: Option<String>,
    pub field_type: Option<String>,
    pub is_active: Option<bool>,
}

impl TemplateFilter {
    pub fn conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::new();
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            conditions.push(Condition::eq("category", category));
        }
        if let Some(field_type) = self.field_type.as_deref().filter(|t| !t.is_empty()) {
            conditions.push(Condition::eq("field_type", field_type));
        }
        if let Some(is_active) = self.is_active {
            conditions.push(Condition::eq("is_active", is_active));
        }
        conditions
    }

    pub fn matches(&self, template: &FieldTemplate) -> bool {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map_or(true, |c| template.category == c)
            && self
                .field_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .map_or(true, |t| template.field_type == t)
            && self.is_active.map_or(true, |a| template.is_active == a)
    }
}

impl FieldTemplate {
    /// Snapshot copy for `user_id`. The result shares no state with the template.
    pub fn apply_to_user(&self, user_id: i64) -> NewProfileField {
        NewProfileField {
            user_id,
            field_key: self.field_key.clone(),
            field_name: self.field_name.clone(),
            field_type: self.field_type.clone(),
            is_system: true,
            is_required: self.is_required,
            is_searchable: self.is_searchable,
            is_public: self.is_public,
            default_value: self.default_value.clone(),
            options: self.options.clone(),
            validation: self.validation.clone(),
            display_order: self.display_order,
            icon: self.icon.clone(),
            description: self.description.clone(),
        }
    }

    /// Merges a partial update. JSON text fields are expected to be checked
    /// by the caller beforehand.
    pub fn apply_update(&mut self, req: UpdateFieldTemplateRequest) {
        fn set_if_present(target: &mut String, value: String) {
            if !value.is_empty() {
                *target = value;
            }
        }

        set_if_present(&mut self.field_name, req.field_name);
        set_if_present(&mut self.field_type, req.field_type);
        set_if_present(&mut self.default_value, req.default_value);
        set_if_present(&mut self.options, req.options);
        set_if_present(&mut self.validation, req.validation);
        set_if_present(&mut self.icon, req.icon);
        set_if_present(&mut self.description, req.description);
        set_if_present(&mut self.default_unlock_rules, req.default_unlock_rules);
        set_if_present(&mut self.category, req.category);

        if let Some(v) = req.is_required {
            self.is_required = v;
        }
        if let Some(v) = req.is_searchable {
            self.is_searchable = v;
        }
        if let Some(v) = req.is_public {
            self.is_public = v;
        }
        if let Some(v) = req.display_order {
            self.display_order = v;
        }
        if let Some(v) = req.is_active {
            self.is_active = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> FieldTemplate {
        FieldTemplate {
            id: 4,
            field_key: "education".into(),
            field_name: "Education".into(),
            field_type: "SELECT_SINGLE".into(),
            is_required: false,
            is_searchable: true,
            is_public: true,
            default_value: "".into(),
            options: r#"{"options":[{"key":"bachelor"}]}"#.into(),
            validation: "{}".into(),
            display_order: 10,
            icon: "".into(),
            description: "Highest degree".into(),
            default_unlock_rules: "".into(),
            category: "background".into(),
            is_active: true,
            create_time: Utc::now(),
            update_time: Utc::now(),
        }
    }

    #[test]
    fn apply_to_user_copies_values_and_marks_system() {
        let mut t = FieldTemplate {
            is_required: true,
            is_public: false,
            default_value: "bachelor".into(),
            icon: "school".into(),
            ..template()
        };
        let field = t.apply_to_user(42);

        let assert_copied = |field: &NewProfileField| {
            assert_eq!(field.user_id, 42);
            assert_eq!(field.field_key, "education");
            assert_eq!(field.field_name, "Education");
            assert_eq!(field.field_type, "SELECT_SINGLE");
            assert!(field.is_required);
            assert!(field.is_searchable);
            assert!(!field.is_public);
            assert_eq!(field.default_value, "bachelor");
            assert_eq!(field.options, r#"{"options":[{"key":"bachelor"}]}"#);
            assert_eq!(field.validation, "{}");
            assert_eq!(field.display_order, 10);
            assert_eq!(field.icon, "school");
            assert_eq!(field.description, "Highest degree");
            assert!(field.is_system);
        };
        assert_copied(&field);

        t.apply_update(UpdateFieldTemplateRequest {
            field_name: "Degree".into(),
            field_type: "TEXT".into(),
            is_required: Some(false),
            is_searchable: Some(false),
            is_public: Some(true),
            default_value: "master".into(),
            options: r#"{"options":[]}"#.into(),
            validation: r#"{"required":true}"#.into(),
            display_order: Some(1),
            icon: "cap".into(),
            description: "Changed".into(),
            ..Default::default()
        });
        assert_copied(&field);
        // a fresh apply picks up the new values
        assert_eq!(t.apply_to_user(42).field_name, "Degree");
    }

    #[test]
    fn update_with_only_is_active_leaves_everything_else() {
        let mut t = template();
        let before = t.clone();
        t.apply_update(UpdateFieldTemplateRequest { is_active: Some(false), ..Default::default() });
        assert!(!t.is_active);
        assert_eq!(FieldTemplate { is_active: true, ..t }, before);
    }

    #[test]
    fn empty_strings_do_not_overwrite() {
        let mut t = template();
        t.apply_update(UpdateFieldTemplateRequest {
            field_name: "Degree".into(),
            display_order: Some(0),
            ..Default::default()
        });
        assert_eq!(t.field_name, "Degree");
        assert_eq!(t.display_order, 0);
        assert_eq!(t.description, "Highest degree");
    }

    #[test]
    fn create_request_defaults_and_validation() {
        let req: CreateFieldTemplateRequest = serde_json::from_value(json!({
            "field_key": "education",
            "field_name": "Education",
            "field_type": "TEXT"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        let new = NewFieldTemplate::from(req);
        assert!(new.is_active);
        assert_eq!(new.display_order, 0);

        let bad: CreateFieldTemplateRequest =
            serde_json::from_value(json!({"field_key": "", "field_name": "x", "field_type": ""})).unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("field_key"));
        assert!(fields.contains_key("field_type"));
        assert!(!fields.contains_key("field_name"));
    }

    #[test]
    fn filter_builds_conditions_in_order() {
        let filter = TemplateFilter {
            category: Some("basic".into()),
            field_type: Some(String::new()),
            is_active: Some(true),
        };
        let conditions = filter.conditions();
        assert_eq!(
            conditions,
            vec![Condition::eq("category", "basic"), Condition::eq("is_active", true)]
        );
        assert!(filter.matches(&FieldTemplate { category: "basic".into(), ..template() }));
        assert!(!filter.matches(&template()));
    }
}
