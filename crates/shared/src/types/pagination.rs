//! Page-count arithmetic for paginated output.

use serde::{Deserialize, Serialize};

/// Returns how many pages `total` items occupy at `per_page` items per page.
///
/// An empty list still occupies one page so that headers have somewhere to go.
/// Returns 0 only when `per_page` is 0.
#[must_use]
pub const fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else if total == 0 {
        1
    } else {
        total.div_ceil(per_page)
    }
}

/// Pagination metadata for one page of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number (1-indexed).
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Total number of items across all pages.
    pub total: usize,
    /// Total number of pages.
    pub total_pages: usize,
}

impl PageMeta {
    /// Creates metadata for the given 1-indexed page.
    #[must_use]
    pub const fn new(page: usize, per_page: usize, total: usize) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: page_count(total, per_page),
        }
    }

    /// Returns true if this is the final page.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}
