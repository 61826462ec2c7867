pub mod auth;
pub mod response;

pub use auth::{optional_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
