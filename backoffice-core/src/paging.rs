//! Pagination over the filtered view.
//!
//! Page indices are 1-based. Every window is clamped into
//! `[1, max(1, ceil(total / page_size))]`; an empty view still has one page.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::ops::{Range, RangeInclusive};

/// Default rows per page for screens that do not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of pages for `total_items` rows; never less than 1.
pub fn total_pages(total_items: usize, page_size: NonZeroUsize) -> usize {
    total_items.div_ceil(page_size.get()).max(1)
}

/// Compute the window for a requested page, clamping the index into range.
pub fn paginate(total_items: usize, page_size: NonZeroUsize, page_index: usize) -> PageWindow {
    let total_pages = total_pages(total_items, page_size);
    let page_index = page_index.clamp(1, total_pages);
    let start = ((page_index - 1) * page_size.get()).min(total_items);
    let end = (start + page_size.get()).min(total_items);
    PageWindow {
        page_index,
        page_size: page_size.get(),
        total_pages,
        total_items,
        start,
        end,
    }
}

/// A resolved page: clamped index plus the item range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_index: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    /// Slice of the filtered view shown on this page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end.min(items.len());
        let start = self.start.min(end);
        &items[start..end]
    }

    /// Page buttons, `1..=total_pages`.
    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.total_pages
    }

    /// 1-based row number of the first item on this page.
    pub fn first_row_number(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.start + 1
        }
    }

    /// `Showing 11 to 20 of 23`
    pub fn label(&self) -> String {
        format!(
            "Showing {} to {} of {}",
            self.first_row_number(),
            self.end,
            self.total_items
        )
    }
}

/// Page position owned by a list store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page_index: usize,
    page_size: NonZeroUsize,
}

impl PageRequest {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_index: 1,
            page_size,
        }
    }

    /// Page size from configuration; zero is treated as one.
    pub fn with_page_size(page_size: usize) -> Self {
        Self::new(NonZeroUsize::new(page_size).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn window(&self, total_items: usize) -> PageWindow {
        paginate(total_items, self.page_size, self.page_index)
    }

    /// Re-clamp after the item count changed.
    pub fn clamp(&mut self, total_items: usize) {
        self.page_index = self.window(total_items).page_index;
    }

    pub fn reset(&mut self) {
        self.page_index = 1;
    }

    pub fn go_to(&mut self, page_index: usize, total_items: usize) {
        self.page_index = paginate(total_items, self.page_size, page_index).page_index;
    }

    pub fn next(&mut self, total_items: usize) {
        self.go_to(self.page_index.saturating_add(1), total_items);
    }

    pub fn previous(&mut self, total_items: usize) {
        self.go_to(self.page_index.saturating_sub(1), total_items);
    }

    /// Change the page size and re-clamp so the user is not stranded.
    pub fn set_page_size(&mut self, page_size: NonZeroUsize, total_items: usize) {
        self.page_size = page_size;
        self.clamp(total_items);
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_twenty_three_records_make_three_pages() {
        let window = paginate(23, size(10), 1);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.range(), 0..10);
    }

    #[test]
    fn test_out_of_range_page_clamps_to_last() {
        let window = paginate(23, size(10), 99);
        assert_eq!(window.page_index, 3);
        assert_eq!(window.range(), 20..23);
        assert_eq!(window.label(), "Showing 21 to 23 of 23");
        assert!(!window.has_next());
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        assert_eq!(paginate(5, size(2), 0).page_index, 1);
    }

    #[test]
    fn test_empty_view_has_one_empty_page() {
        let window = paginate(0, size(10), 4);
        assert_eq!(window.page_index, 1);
        assert_eq!(window.total_pages, 1);
        assert!(window.is_empty());
        assert_eq!(window.label(), "Showing 0 to 0 of 0");
    }

    #[test]
    fn test_changing_page_size_reclamps() {
        let mut request = PageRequest::with_page_size(5);
        request.go_to(5, 23);
        assert_eq!(request.page_index(), 5);
        request.set_page_size(size(10), 23);
        assert_eq!(request.page_index(), 3);
    }

    #[test]
    fn test_next_and_previous_stop_at_bounds() {
        let mut request = PageRequest::with_page_size(10);
        request.previous(23);
        assert_eq!(request.page_index(), 1);
        request.next(23);
        request.next(23);
        request.next(23);
        assert_eq!(request.page_index(), 3);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        assert_eq!(PageRequest::with_page_size(0).page_size(), 1);
    }

    proptest! {
        #[test]
        fn prop_page_index_always_in_range(
            total in 0usize..500,
            page_size in 1usize..50,
            requested in 0usize..1000
        ) {
            let window = paginate(total, size(page_size), requested);
            prop_assert!(window.page_index >= 1);
            prop_assert!(window.page_index <= window.total_pages);
            prop_assert_eq!(window.total_pages, std::cmp::max(1, total.div_ceil(page_size)));
            prop_assert!(window.len() <= page_size);
            prop_assert!(window.end <= total);
        }

        #[test]
        fn prop_pagination_is_deterministic(
            total in 0usize..200,
            page_size in 1usize..20,
            requested in 0usize..50
        ) {
            prop_assert_eq!(
                paginate(total, size(page_size), requested),
                paginate(total, size(page_size), requested)
            );
        }

        #[test]
        fn prop_pages_cover_view_exactly_once(total in 0usize..200, page_size in 1usize..20) {
            let items: Vec<usize> = (0..total).collect();
            let pages = total_pages(total, size(page_size));
            let mut seen = Vec::new();
            for page in 1..=pages {
                seen.extend_from_slice(paginate(total, size(page_size), page).slice(&items));
            }
            prop_assert_eq!(seen, items);
        }
    }
}
