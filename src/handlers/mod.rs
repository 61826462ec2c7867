// Route handlers, one module per resource. Routing lives in `crate::app`.
pub mod field_templates;
pub mod health;
pub mod profile_fields;
pub mod troves;
pub mod users;
pub mod weapons;
