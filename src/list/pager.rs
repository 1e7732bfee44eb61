//! Page slicing and page-index bookkeeping.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{CatalogError, Result};

/// Page sizes offered to the user.
pub const PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of page buttons shown around the current page.
pub const DEFAULT_PAGE_WINDOW: usize = 5;

/// Reject page sizes the UI does not offer.
pub fn validate_page_size(size: usize) -> Result<usize> {
    if PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(CatalogError::validation(
            "items_per_page",
            format!("{size} is not one of 10, 20, 50, 100"),
        ))
    }
}

/// Number of pages needed for `count` items; never less than one.
pub fn total_pages(count: usize, items_per_page: usize) -> usize {
    count.div_ceil(items_per_page.max(1)).max(1)
}

/// Current page (1-based) and page size.
///
/// Invariant: `current_page <= total_pages(count, items_per_page)` after
/// every call to [`PageState::clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    current_page: usize,
    items_per_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            items_per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageState {
    pub fn new(items_per_page: usize) -> Result<Self> {
        if items_per_page == 0 {
            return Err(CatalogError::validation(
                "items_per_page",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            current_page: 1,
            items_per_page,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn total_pages(&self, count: usize) -> usize {
        total_pages(count, self.items_per_page)
    }

    /// Move to `page`. Out-of-range pages are rejected and leave the
    /// current page unchanged.
    pub fn go_to_page(&mut self, page: usize, count: usize) -> bool {
        if page < 1 || page > self.total_pages(count) {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self, count: usize) -> bool {
        self.go_to_page(self.current_page + 1, count)
    }

    pub fn prev_page(&mut self, count: usize) -> bool {
        self.current_page > 1 && self.go_to_page(self.current_page - 1, count)
    }

    /// Change the page size. The page number loses its meaning, so the
    /// current page goes back to 1.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<()> {
        *self = Self::new(items_per_page)?;
        Ok(())
    }

    /// Pull the current page back onto the last valid page for `count`
    /// items. Returns `true` if the page changed.
    pub fn clamp(&mut self, count: usize) -> bool {
        let last = self.total_pages(count);
        if self.current_page > last {
            self.current_page = last;
            true
        } else {
            false
        }
    }

    /// Index range of the current page within a list of `count` items.
    fn slice_bounds(&self, count: usize) -> (usize, usize) {
        let page = self.current_page.min(self.total_pages(count));
        let start = ((page - 1) * self.items_per_page).min(count);
        let end = (start + self.items_per_page).min(count);
        (start, end)
    }
}

/// One page of items plus the page count it was cut from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub page_items: Vec<T>,
    pub total_pages: usize,
}

/// Cut the current page out of `items`.
///
/// A current page past the end is read as the last page, so a non-empty
/// list never yields an empty page.
pub fn paginate<T: Clone>(items: &[T], page: &PageState) -> Paginated<T> {
    let (start, end) = page.slice_bounds(items.len());
    Paginated {
        page_items: items[start..end].to_vec(),
        total_pages: page.total_pages(items.len()),
    }
}

/// Page numbers to show as buttons: a run of at most `max_buttons` pages
/// centered on `current`, shifted to stay within `1..=total`.
pub fn page_window(current: usize, total: usize, max_buttons: usize) -> RangeInclusive<usize> {
    let total = total.max(1);
    let max_buttons = max_buttons.max(1);
    let current = current.clamp(1, total);

    let mut start = current.saturating_sub(max_buttons / 2).max(1);
    let end = (start + max_buttons - 1).min(total);
    if end - start + 1 < max_buttons {
        start = (end + 1).saturating_sub(max_buttons).max(1);
    }
    start..=end
}

/// "Showing first–last of total" figures for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

impl PageSummary {
    pub fn new(page: &PageState, count: usize) -> Self {
        let (start, end) = page.slice_bounds(count);
        if count == 0 {
            return Self {
                first: 0,
                last: 0,
                total: 0,
            };
        }
        Self {
            first: start + 1,
            last: end,
            total: count,
        }
    }
}
