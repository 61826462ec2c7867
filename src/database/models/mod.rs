pub mod field_template;
pub mod profile_field;
pub mod trove;
pub mod user;
pub mod weapon;

pub use field_template::{
    CreateFieldTemplateRequest, FieldTemplate, NewFieldTemplate, TemplateFilter,
    UpdateFieldTemplateRequest,
};
pub use profile_field::{NewProfileField, ProfileField};
pub use trove::{CreateTroveRequest, Trove, UpdateTroveRequest};
pub use user::{UpdateUserRequest, User};
pub use weapon::{CreateWeaponRequest, NewWeapon, UpdateWeaponRequest, Weapon};
