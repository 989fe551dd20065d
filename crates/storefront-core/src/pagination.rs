//! # Pagination
//!
//! Page/limit clamping for catalog listings.
//!
//! ## Rules
//! ```text
//! page  missing or < 1        → 1
//! limit missing or < 1        → 10
//! limit > 100                 → 100
//! (page - 1) × limit > 10 000 → page lowered so the offset stays ≤ 10 000
//! ```
//! Deep offsets make SQLite walk and discard rows, so they are capped.

use serde::Serialize;

/// Default page size when the client does not ask for one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Largest row offset a listing will skip.
pub const MAX_OFFSET: u32 = 10_000;

/// A clamped page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamps raw client values into a valid request.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::pagination::PageRequest;
    ///
    /// let req = PageRequest::new(Some(0), Some(500));
    /// assert_eq!((req.page, req.limit), (1, 100));
    /// ```
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => 1,
        };

        let limit = match limit {
            Some(l) if l >= 1 => u32::try_from(l).unwrap_or(MAX_LIMIT).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };

        let page = if u64::from(page - 1) * u64::from(limit) > u64::from(MAX_OFFSET) {
            (MAX_OFFSET / limit).max(1)
        } else {
            page
        };

        PageRequest { page, limit }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

/// Paging metadata returned next to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit);
        PageMeta {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// A page of items with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
