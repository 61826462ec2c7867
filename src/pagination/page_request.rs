use serde::{Deserialize, Serialize};

use super::error::PageError;
use super::types::{SortOrder, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Raw pagination parameters as they arrive on the query string.
///
/// Everything is kept as a string so that malformed numbers fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub keyword: Option<String>,
    pub search_by: Option<String>,
}

/// Normalised pagination, sort and search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub keyword: Option<String>,
    pub search_by: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_order: SortOrder::Desc,
            keyword: None,
            search_by: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: normalize_page(page),
            page_size: normalize_page_size(page_size),
            ..Default::default()
        }
    }

    pub fn from_params(params: PageParams) -> Self {
        let page = params.page.as_deref().map(parse_int).unwrap_or(DEFAULT_PAGE as i64);
        let page_size = params
            .page_size
            .as_deref()
            .map(parse_int)
            .unwrap_or(DEFAULT_PAGE_SIZE as i64);

        Self {
            page: normalize_page(page),
            page_size: normalize_page_size(page_size),
            sort_by: non_empty(params.sort_by),
            sort_order: params
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            keyword: non_empty(params.keyword),
            search_by: non_empty(params.search_by),
        }
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = non_empty(Some(sort_by.into()));
        self.sort_order = sort_order;
        self
    }

    pub fn with_search(mut self, keyword: impl Into<String>, search_by: Option<&str>) -> Self {
        self.keyword = non_empty(Some(keyword.into()));
        self.search_by = non_empty(search_by.map(str::to_string));
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn has_sort(&self) -> bool {
        self.sort_by.is_some()
    }

    pub fn has_search(&self) -> bool {
        self.keyword.is_some()
    }

    pub fn keyword(&self) -> &str {
        self.keyword.as_deref().unwrap_or("")
    }

    /// True when no sort field was requested or it is one of `allowed_fields`.
    pub fn validate_sort_field(&self, allowed_fields: &[&str]) -> bool {
        is_allowed(self.sort_by.as_deref(), allowed_fields)
    }

    /// True when no search field was requested or it is one of `allowed_fields`.
    pub fn validate_search_field(&self, allowed_fields: &[&str]) -> bool {
        is_allowed(self.search_by.as_deref(), allowed_fields)
    }

    /// Resolve the requested sort field to the matching static column name.
    pub fn resolve_sort_field(
        &self,
        allowed_fields: &'static [&'static str],
    ) -> Result<Option<&'static str>, PageError> {
        resolve(self.sort_by.as_deref(), allowed_fields)
            .map_err(|name| PageError::InvalidSortField(name.to_string()))
    }

    /// Resolve the requested search field to the matching static column name.
    pub fn resolve_search_field(
        &self,
        allowed_fields: &'static [&'static str],
    ) -> Result<Option<&'static str>, PageError> {
        resolve(self.search_by.as_deref(), allowed_fields)
            .map_err(|name| PageError::InvalidSearchField(name.to_string()))
    }
}

fn parse_int(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}

fn normalize_page(page: i64) -> u32 {
    if page < 1 {
        DEFAULT_PAGE
    } else {
        u32::try_from(page).unwrap_or(u32::MAX)
    }
}

fn normalize_page_size(page_size: i64) -> u32 {
    if page_size < 1 {
        DEFAULT_PAGE_SIZE
    } else if page_size > MAX_PAGE_SIZE as i64 {
        MAX_PAGE_SIZE
    } else {
        page_size as u32
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn is_allowed(field: Option<&str>, allowed_fields: &[&str]) -> bool {
    match field {
        None => true,
        Some(name) => allowed_fields.iter().any(|allowed| *allowed == name),
    }
}

fn resolve<'a>(
    field: Option<&'a str>,
    allowed_fields: &'static [&'static str],
) -> Result<Option<&'static str>, &'a str> {
    match field {
        None => Ok(None),
        Some(name) => allowed_fields
            .iter()
            .copied()
            .find(|allowed| *allowed == name)
            .map(Some)
            .ok_or(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> PageParams {
        let mut p = PageParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "page" => p.page = v,
                "page_size" => p.page_size = v,
                "sort_by" => p.sort_by = v,
                "sort_order" => p.sort_order = v,
                "keyword" => p.keyword = v,
                "search_by" => p.search_by = v,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn defaults_when_params_missing() {
        let req = PageRequest::from_params(PageParams::default());
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 10);
        assert_eq!(req.sort_order, SortOrder::Desc);
        assert!(req.sort_by.is_none());
        assert!(!req.has_search());
    }

    #[test]
    fn custom_values_are_kept() {
        let req = PageRequest::from_params(params(&[
            ("page", "2"),
            ("page_size", "20"),
            ("sort_by", "created_at"),
            ("sort_order", "asc"),
            ("keyword", "john"),
            ("search_by", "username"),
        ]));
        assert_eq!(req.page, 2);
        assert_eq!(req.page_size, 20);
        assert_eq!(req.sort_by.as_deref(), Some("created_at"));
        assert_eq!(req.sort_order, SortOrder::Asc);
        assert_eq!(req.keyword(), "john");
        assert_eq!(req.search_by.as_deref(), Some("username"));
    }

    #[test]
    fn page_below_one_becomes_one() {
        for raw in ["0", "-1", "-500", "abc", ""] {
            let req = PageRequest::from_params(params(&[("page", raw)]));
            assert_eq!(req.page, 1, "page={raw:?}");
        }
    }

    #[test]
    fn page_size_is_defaulted_and_clamped() {
        assert_eq!(PageRequest::from_params(params(&[("page_size", "0")])).page_size, 10);
        assert_eq!(PageRequest::from_params(params(&[("page_size", "def")])).page_size, 10);
        assert_eq!(PageRequest::from_params(params(&[("page_size", "100")])).page_size, 100);
        for raw in ["101", "200", "999999"] {
            let req = PageRequest::from_params(params(&[("page_size", raw)]));
            assert_eq!(req.page_size, 100, "page_size={raw}");
        }
    }

    #[test]
    fn unknown_sort_order_falls_back_to_desc() {
        for raw in ["invalid", "ASC", "Desc", ""] {
            let req = PageRequest::from_params(params(&[("sort_order", raw)]));
            assert_eq!(req.sort_order, SortOrder::Desc, "sort_order={raw:?}");
        }
    }

    #[test]
    fn offset_and_limit() {
        let req = PageRequest::new(3, 25);
        assert_eq!(req.offset(), 50);
        assert_eq!(req.limit(), 25);
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
    }

    #[test]
    fn empty_sort_field_is_always_valid() {
        let req = PageRequest::default();
        assert!(req.validate_sort_field(&[]));
        assert!(req.validate_sort_field(&["a", "b"]));
        assert!(req.validate_search_field(&[]));
    }

    #[test]
    fn sort_field_outside_allow_list_is_rejected() {
        let req = PageRequest::default().with_sort("c", SortOrder::Asc);
        assert!(!req.validate_sort_field(&["a", "b"]));
        assert!(req.validate_sort_field(&["a", "b", "c"]));
    }

    #[test]
    fn search_field_outside_allow_list_is_rejected() {
        let req = PageRequest::default().with_search("x", Some("password"));
        assert!(!req.validate_search_field(&["username", "email"]));
    }

    #[test]
    fn resolve_returns_static_column_or_error() {
        static COLUMNS: &[&str] = &["id", "name"];
        let req = PageRequest::default().with_sort("name", SortOrder::Asc);
        assert_eq!(req.resolve_sort_field(COLUMNS), Ok(Some("name")));

        let bad = PageRequest::default().with_sort("name; DROP TABLE x", SortOrder::Asc);
        assert_eq!(
            bad.resolve_sort_field(COLUMNS),
            Err(PageError::InvalidSortField("name; DROP TABLE x".to_string()))
        );

        let bad_search = PageRequest::default().with_search("k", Some("secret"));
        assert_eq!(
            bad_search.resolve_search_field(COLUMNS),
            Err(PageError::InvalidSearchField("secret".to_string()))
        );
    }
}
