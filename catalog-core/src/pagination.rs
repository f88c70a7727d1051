//! Page arithmetic shared by the product list and the remote slicing.
//!
//! Pages are 1-based. Everything here is a pure function of the current page,
//! the page size and the total item count; no state is kept.

/// Number of products shown per page. The remote slicing in
/// [`crate::products::api::fetch_page`] uses the same value, so the two
/// always agree on window boundaries.
pub const PAGE_SIZE: usize = 5;

/// Half-open offset range `[start, end)` of one page in the full collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    /// The part of `items` covered by this window, cut short at the end of the slice.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start.min(items.len());
        let end = self.end.min(items.len());
        &items[start..end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Offset window for `current_page`. Page 0 is treated as page 1.
pub fn window(current_page: usize, page_size: usize) -> PageWindow {
    let start = current_page.saturating_sub(1) * page_size;
    PageWindow {
        start,
        end: start + page_size,
    }
}

/// `ceil(total_count / page_size)`; an empty collection has zero pages.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    debug_assert!(page_size > 0, "page size must be positive");
    total_count.div_ceil(page_size)
}

/// Accept a navigation request only when it lands inside `[1, total_pages]`.
/// `None` means the request is ignored and the current page stays as it is.
pub fn clamp(requested_page: usize, total_pages: usize) -> Option<usize> {
    if requested_page >= 1 && requested_page <= total_pages {
        Some(requested_page)
    } else {
        None
    }
}

/// Page to show after a delete shrank the collection to `new_total_pages`.
///
/// Steps back to the new last page when the current one no longer exists.
/// Otherwise the current page is kept and the caller reloads its window,
/// which may now start one item later than before.
pub fn post_delete_page(current_page: usize, new_total_pages: usize) -> usize {
    if current_page > new_total_pages && new_total_pages > 0 {
        new_total_pages
    } else {
        current_page
    }
}

/// Page to show after a create grew the collection.
///
/// When the product spilled onto a page that did not exist before, jump to
/// that new last page; otherwise stay where we are.
pub fn post_create_page(
    current_page: usize,
    new_total_pages: usize,
    previous_total_pages: usize,
) -> usize {
    if new_total_pages > previous_total_pages {
        new_total_pages
    } else {
        current_page
    }
}

pub fn can_go_prev(current_page: usize) -> bool {
    current_page > 1
}

pub fn can_go_next(current_page: usize, total_pages: usize) -> bool {
    current_page < total_pages
}
