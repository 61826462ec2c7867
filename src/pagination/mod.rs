pub mod error;
pub mod page_query;
pub mod page_request;
pub mod page_response;
pub mod types;

pub use error::PageError;
pub use page_query::{Condition, PageQuery};
pub use page_request::{PageParams, PageRequest};
pub use page_response::PageResponse;
pub use types::*;
