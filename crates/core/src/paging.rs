//! Paginated query results.

use serde::Serialize;

/// One page of query results plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

impl<T> PaginatedResult<T> {
    /// `total_count` is the count of all items matching the filter, ignoring
    /// paging. `total_pages` rounds up.
    pub fn new(items: Vec<T>, total_count: usize, page_number: usize, page_size: usize) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };
        Self {
            items,
            page_number,
            page_size,
            total_count,
            total_pages,
        }
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }

    /// Map the items while keeping the page metadata. Used to project
    /// aggregates into response DTOs.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}
