use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Pagination envelope shared by every list endpoint. Field names are
/// camelCase on the wire, matching what the administrative frontend consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub items_per_page: i64,
}

impl Pagination {
    pub fn new(total_items: i64, current_page: i64, items_per_page: i64) -> Self {
        let items_per_page = items_per_page.max(1);
        let total_pages = (total_items + items_per_page - 1) / items_per_page;
        Self {
            total_items,
            total_pages,
            current_page,
            items_per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total_items: i64, page: i64, limit: i64) -> Self {
        Self {
            data,
            pagination: Pagination::new(total_items, page, limit),
        }
    }
}

/// Normalizes raw `page`/`limit` query values into a (page, limit, offset)
/// triple with sane bounds.
pub fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100);
    let offset = (page - 1) * limit;
    (page, limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_total_pages_up() {
        let p = Pagination::new(57, 2, 10);
        assert_eq!(p.total_pages, 6);
        assert_eq!(p.current_page, 2);
    }

    #[test]
    fn pagination_handles_zero_items() {
        let p = Pagination::new(0, 1, 10);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn page_window_defaults_and_offset() {
        assert_eq!(page_window(None, None), (1, 10, 0));
        assert_eq!(page_window(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
    }
}
