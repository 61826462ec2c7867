use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only the exact strings "asc" and "desc" are recognised; anything else is Desc.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A table that can be listed through [`PageQuery`](super::PageQuery).
///
/// The column sets are the only identifiers that ever get interpolated into
/// SQL text; request strings are resolved against them and never used directly.
pub trait PageEntity {
    const TABLE: &'static str;
    const SORTABLE: &'static [&'static str];
    const SEARCHABLE: &'static [&'static str];
    /// Raw ORDER BY body used when the request carries no sort field.
    const DEFAULT_ORDER: &'static str;
    const SELECT: &'static str = "*";
    const SOFT_DELETE: bool = true;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
