pub mod field_template;
pub mod profile_field;
pub mod trove;
pub mod user;
pub mod weapon;

pub use field_template::{FieldTemplateRepository, PgFieldTemplateRepository};
pub use profile_field::{PgProfileFieldRepository, ProfileFieldRepository};
pub use trove::{PgTroveRepository, TroveRepository};
pub use user::{PgUserRepository, UserRepository};
pub use weapon::{PgWeaponRepository, WeaponRepository};
