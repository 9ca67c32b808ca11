//! Offset/limit arithmetic and the page-number window
//!
//! Pages are 1-indexed, offsets are row counts. All functions expect
//! `limit > 0`; callers validate limits at the store boundary.

use serde::{Deserialize, Serialize};

/// Default cap on the number of entries in a page-number strip
pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 7;

/// Smallest strip the window algorithm can lay out (first, filler, current, filler, last)
const MIN_VISIBLE_PAGES: usize = 5;

/// Number of pages needed to show `total_count` rows, `limit` per page
pub fn page_count(total_count: u64, limit: usize) -> usize {
    let limit = limit.max(1) as u64;
    let pages = total_count / limit + u64::from(total_count % limit != 0);
    pages.min(usize::MAX as u64) as usize
}

/// 1-indexed page containing `offset`
pub fn current_page(offset: usize, limit: usize) -> usize {
    offset / limit.max(1) + 1
}

/// Snap `offset` down to a page boundary for `limit`.
///
/// Used when the page size changes so the previously viewed row stays on a
/// valid page.
pub fn normalize_offset(limit: usize, offset: usize) -> usize {
    let limit = limit.max(1);
    if offset % limit == 0 {
        offset
    } else {
        (offset / limit) * limit
    }
}

/// Offset of the first row on `page` (1-indexed)
pub fn page_offset(page: usize, limit: usize) -> usize {
    page.saturating_sub(1).saturating_mul(limit)
}

/// One entry of a page-number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PageItem {
    /// A clickable page number
    Page { number: usize },
    /// Placeholder for the skipped pages `first..=last`, never clickable
    Filler { first: usize, last: usize },
}

impl PageItem {
    fn page(number: usize) -> Self {
        Self::Page { number }
    }

    pub fn page_number(&self) -> Option<usize> {
        match self {
            Self::Page { number } => Some(*number),
            Self::Filler { .. } => None,
        }
    }

    pub fn is_filler(&self) -> bool {
        matches!(self, Self::Filler { .. })
    }

    /// Pages hidden behind a filler (for an overflow sub-menu)
    pub fn skipped_pages(&self) -> Option<std::ops::RangeInclusive<usize>> {
        match self {
            Self::Filler { first, last } => Some(*first..=*last),
            Self::Page { .. } => None,
        }
    }
}

/// Lay out a page-number strip of at most `max_visible_pages` entries.
///
/// - Every page when they all fit.
/// - Near the start: pages `1..=max-2`, a filler, the last page.
/// - Near the end: page 1, a filler, the last `max-3` pages.
/// - Otherwise: page 1, a filler, `max-4` pages around the current page, a
///   filler, the last page. With an even `max` the block holds one more page
///   after the current page than before it.
///
/// `max_visible_pages` below 5 is raised to 5.
pub fn visible_pages(page_count: usize, current_page: usize, max_visible_pages: usize) -> Vec<PageItem> {
    let max = max_visible_pages.max(MIN_VISIBLE_PAGES);

    if page_count <= max {
        return (1..=page_count).map(PageItem::page).collect();
    }

    let filler = |first: usize, last: usize| PageItem::Filler { first, last };

    if current_page <= max - 3 {
        let mut items: Vec<PageItem> = (1..=max - 2).map(PageItem::page).collect();
        items.push(filler(max - 1, page_count - 1));
        items.push(PageItem::page(page_count));
        return items;
    }

    if current_page > page_count - max + 3 {
        let tail_start = page_count - (max - 3) + 1;
        let mut items = vec![PageItem::page(1), filler(2, tail_start - 1)];
        items.extend((tail_start..=page_count).map(PageItem::page));
        return items;
    }

    // An even strip puts the extra page after the current one.
    let before = (max - 5) / 2;
    let after = max - 5 - before;
    let (start, end) = (current_page - before, current_page + after);
    let mut items = vec![PageItem::page(1), filler(2, start - 1)];
    items.extend((start..=end).map(PageItem::page));
    items.push(filler(end + 1, page_count - 1));
    items.push(PageItem::page(page_count));
    items
}

/// Summary of the current paging window, for footers and navigation buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub limit: usize,
    pub offset: usize,
    /// Rows in the full result, if known
    pub total_count: Option<u64>,
    /// Rows actually present on the current page
    pub rows_on_page: usize,
}

impl PageInfo {
    pub fn new(limit: usize, offset: usize, total_count: Option<u64>, rows_on_page: usize) -> Self {
        Self {
            limit,
            offset,
            total_count,
            rows_on_page,
        }
    }

    pub fn current_page(&self) -> usize {
        current_page(self.offset, self.limit)
    }

    /// Total pages, at least 1 once the total is known
    pub fn page_count(&self) -> Option<usize> {
        self.total_count
            .map(|total| page_count(total, self.limit).max(1))
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page() > 1
    }

    /// Without a known total, a full page suggests there is more
    pub fn can_go_next(&self) -> bool {
        match self.page_count() {
            Some(pages) => self.current_page() < pages,
            None => self.rows_on_page >= self.limit,
        }
    }

    /// 1-indexed number of the first row on the page, 0 when the page is empty
    pub fn first_row(&self) -> usize {
        if self.rows_on_page == 0 { 0 } else { self.offset + 1 }
    }

    pub fn last_row(&self) -> usize {
        self.offset + self.rows_on_page
    }

    /// Page strip for this window
    pub fn visible_pages(&self, max_visible_pages: usize) -> Vec<PageItem> {
        visible_pages(
            self.page_count().unwrap_or_else(|| self.current_page()),
            self.current_page(),
            max_visible_pages,
        )
    }

    /// e.g. "11-20 of 95 (page 2 of 10)"
    pub fn status_text(&self) -> String {
        match (self.total_count, self.page_count()) {
            (Some(total), Some(pages)) => format!(
                "{}-{} of {} (page {} of {})",
                self.first_row(),
                self.last_row(),
                total,
                self.current_page(),
                pages
            ),
            _ => format!(
                "{}-{} (page {})",
                self.first_row(),
                self.last_row(),
                self.current_page()
            ),
        }
    }
}
