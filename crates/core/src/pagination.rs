//! Page/page-size normalisation for paged list endpoints.
//!
//! Out-of-range values are not rejected; they fall back to the defaults so
//! a sloppy client still gets the first page back.

/// Page number used when the client omits it or sends a non-positive value.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client omits it or sends an out-of-range value.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A normalised 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Build a page request from raw query values.
    ///
    /// - `page <= 0` (or missing) becomes [`DEFAULT_PAGE`].
    /// - `page_size <= 0`, `> MAX_PAGE_SIZE` (or missing) becomes [`DEFAULT_PAGE_SIZE`].
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p > 0 => p,
            _ => DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(s) if s > 0 && s <= MAX_PAGE_SIZE => s,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    /// SQL `LIMIT` for this page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// SQL `OFFSET` for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}
