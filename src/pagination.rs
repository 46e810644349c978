//! Listing pagination math.
//!
//! A [`PaginationPlan`] is a pure function of the article count and the page
//! size. Everything is integer arithmetic: the page count is a ceiling
//! division, so exact multiples never gain a trailing empty page.
//!
//! ```text
//! 33 articles, 16 per page
//!   page index 0 → /blog     skip 0,  limit 16
//!   page index 1 → /blog/2   skip 16, limit 16
//!   page index 2 → /blog/3   skip 32, limit 16
//! ```
//!
//! The page size is a [`NonZeroUsize`] so a zero divisor cannot be
//! constructed.

use std::num::NonZeroUsize;

/// Number of listing pages needed for `total_items` at `page_size` per page.
pub fn plan(total_items: usize, page_size: NonZeroUsize) -> usize {
    total_items.div_ceil(page_size.get())
}

/// 1-based listing page that shows the item at 0-based `position`.
pub fn owning_page(position: usize, page_size: NonZeroUsize) -> usize {
    (position + 1).div_ceil(page_size.get())
}

/// The slice of the sorted collection shown on one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPlan {
    total_items: usize,
    page_size: NonZeroUsize,
}

impl PaginationPlan {
    pub fn new(total_items: usize, page_size: NonZeroUsize) -> Self {
        Self {
            total_items,
            page_size,
        }
    }

    pub fn num_pages(&self) -> usize {
        plan(self.total_items, self.page_size)
    }

    /// Slice bounds of a 0-based page index.
    ///
    /// `limit` is always the page size, even on the last page; consumers
    /// clamp against the collection themselves.
    pub fn bounds_for(&self, page_index: usize) -> PageBounds {
        PageBounds {
            skip: page_index * self.page_size.get(),
            limit: self.page_size.get(),
        }
    }

    pub fn owning_page(&self, position: usize) -> usize {
        owning_page(position, self.page_size)
    }

    /// `(page_index, bounds)` for every page, in order.
    pub fn pages(&self) -> impl Iterator<Item = (usize, PageBounds)> + use<> {
        let plan = *self;
        (0..plan.num_pages()).map(move |i| (i, plan.bounds_for(i)))
    }
}
