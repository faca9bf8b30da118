// src/models/common.rs
// DOCUMENTATION: Shared response envelopes and pagination helpers
// PURPOSE: Keep list endpoints consistent across resources

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalized page/limit pair
/// DOCUMENTATION: Built from optional query parameters, always within bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::with_default(page, limit, DEFAULT_PAGE_SIZE)
    }

    pub fn with_default(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Pagination {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Pagination metadata returned alongside list data
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, pagination: Pagination) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + pagination.limit - 1) / pagination.limit
        };

        PageMeta {
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages,
        }
    }
}

/// Paginated list response
/// DOCUMENTATION: { "data": [...], "meta": { total, page, limit, totalPages } }
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Paginated {
            data,
            meta: PageMeta::new(total, pagination),
        }
    }
}

/// Plain message body for endpoints without a resource to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(None, None);
        assert_eq!((p.page, p.limit, p.offset()), (1, 20, 0));

        let p = Pagination::new(Some(0), Some(500));
        assert_eq!((p.page, p.limit), (1, MAX_PAGE_SIZE));

        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let meta = PageMeta::new(21, Pagination::new(Some(1), Some(10)));
        assert_eq!(meta.total_pages, 3);

        let meta = PageMeta::new(0, Pagination::new(None, None));
        assert_eq!(meta.total_pages, 0);
    }
}
