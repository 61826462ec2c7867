use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("invalid sort field: {0}")]
    InvalidSortField(String),

    #[error("invalid search field: {0}")]
    InvalidSearchField(String),
}
