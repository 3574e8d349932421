//! Page slicing over an in-memory collection.

pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    /// 1-based page actually shown after clamping.
    pub effective_page: usize,
}

impl<T> PageSlice<T> {
    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.total_pages
    }
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Slices `collection` to the requested 1-based page, clamping the request into
/// `1..=total_pages`. An empty collection is one empty page.
pub fn slice<T: Clone>(collection: &[T], page_size: usize, requested_page: usize) -> PageSlice<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(collection.len(), page_size);
    let effective_page = requested_page.clamp(1, total_pages);
    let start = (effective_page - 1) * page_size;
    let end = (start + page_size).min(collection.len());
    let items = collection.get(start..end).unwrap_or_default().to_vec();

    PageSlice {
        items,
        total_pages,
        effective_page,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_size: usize,
    pub current_page: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
        }
    }
}

impl PaginationState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Re-clamps the current page after the collection length changed.
    pub fn clamp_to(&mut self, len: usize) {
        self.current_page = self.current_page.clamp(1, total_pages(len, self.page_size));
    }
}
