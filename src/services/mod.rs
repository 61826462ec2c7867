pub mod error;
pub mod field_template_service;
pub mod profile_field_service;
pub mod trove_service;
pub mod user_service;
pub mod weapon_service;

pub use error::{ServiceError, ServiceResult};
pub use field_template_service::{
    ApplyTemplateResult, ApplyTemplatesResult, FailedItem, FieldTemplateService,
};
pub use profile_field_service::ProfileFieldService;
pub use trove_service::TroveService;
pub use user_service::UserService;
pub use weapon_service::WeaponService;
