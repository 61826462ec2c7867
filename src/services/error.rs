use thiserror::Error;
use validator::ValidationErrors;

use crate::database::DatabaseError;
use crate::pagination::PageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationErrors),

    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error(transparent)]
    InvalidPage(#[from] PageError),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict {
        message: String,
        existing_id: Option<i64>,
    },

    #[error("field template {0} is not active")]
    TemplateInactive(i64),

    #[error("{operation} failed: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: DatabaseError,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>, existing_id: Option<i64>) -> Self {
        ServiceError::Conflict {
            message: message.into(),
            existing_id,
        }
    }

    /// `map_err` adapter that names the failed operation. Rejected page
    /// parameters surface as [`ServiceError::InvalidPage`], not as database failures.
    pub fn db(operation: &'static str) -> impl FnOnce(DatabaseError) -> ServiceError {
        move |err| match err {
            DatabaseError::Page(page) => ServiceError::InvalidPage(page),
            source => ServiceError::Database { operation, source },
        }
    }
}
