use serde::Serialize;

/// One page of results plus the derived navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> PageResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: u32, page_size: u32) -> Self {
        let size = i64::from(page_size.max(1));
        let total_pages = (total.max(0) + size - 1) / size;

        Self {
            data,
            total,
            page,
            page_size,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(total: i64, page: u32, page_size: u32) -> (i64, bool, bool) {
        let r = PageResponse::new(vec!["item"; 3], total, page, page_size);
        (r.total_pages, r.has_next, r.has_prev)
    }

    #[test]
    fn navigation_metadata() {
        assert_eq!(meta(25, 1, 10), (3, true, false));
        assert_eq!(meta(25, 2, 10), (3, true, true));
        assert_eq!(meta(25, 3, 10), (3, false, true));
        assert_eq!(meta(20, 2, 10), (2, false, true));
        assert_eq!(meta(1, 1, 100), (1, false, false));
    }

    #[test]
    fn empty_result_has_no_pages() {
        assert_eq!(meta(0, 1, 10), (0, false, false));
        assert_eq!(meta(0, 4, 10), (0, false, true));
    }

    #[test]
    fn serializes_snake_case_fields() {
        let json = serde_json::to_value(PageResponse::new(vec![1, 2], 2, 1, 10)).unwrap();
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["page_size"], 10);
        assert_eq!(json["has_next"], false);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
