//! Pagination envelope shared by every list endpoint
//!
//! ```json
//! { "data": [...], "total": 42, "page": 2, "totalPages": 5 }
//! ```

use serde::Serialize;

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

/// Normalized page/limit pair extracted from query parameters
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    /// Clamp raw query values: page >= 1, 1 <= limit <= 100
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Offset of the first record on this page
    pub fn start(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// Paged response envelope
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, params: PageParams) -> Self {
        Self {
            data,
            total,
            page: params.page,
            total_pages: total.div_ceil(params.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_and_limit() {
        let p = PageParams::new(None, None);
        assert_eq!((p.page, p.limit), (1, 10));

        let p = PageParams::new(Some(0), Some(500));
        assert_eq!((p.page, p.limit), (1, 100));

        let p = PageParams::new(Some(3), Some(20));
        assert_eq!(p.start(), 40);
    }

    #[test]
    fn computes_total_pages() {
        let params = PageParams::new(Some(1), Some(10));
        let page: Page<u32> = Page::new(vec![], 41, params);
        assert_eq!(page.total_pages, 5);

        let page: Page<u32> = Page::new(vec![], 0, params);
        assert_eq!(page.total_pages, 0);
    }
}
