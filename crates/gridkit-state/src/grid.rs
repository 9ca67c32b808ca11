//! Client-side grid store
//!
//! Holds the full row set and keeps two derived views current:
//! `filtered_ordered_rows` (every row that survives the filter, in order) and
//! `visible_rows` (the page slice of it). Changing rows, filters or ordering
//! reruns the filter/sort pass; changing only limit or offset reslices.

use gridkit_core::{
    FilterFn, Filters, GridError, GridResult, OrderFn, OrderSpec, PageInfo, PageItem, Row,
    filter_and_order, normalize_offset, page_offset,
};

use crate::defaults::GridDefaults;

pub struct GridState {
    rows: Vec<Row>,
    filters: Filters,
    ordering: OrderSpec,
    limit: usize,
    offset: usize,
    filter_fn: Option<FilterFn>,
    order_fn: Option<OrderFn>,

    filtered_ordered_rows: Vec<Row>,
    visible_rows: Vec<Row>,

    batch_depth: usize,
    content_dirty: bool,
    window_dirty: bool,
    recompute_count: u64,
}

impl GridState {
    /// Create an empty grid showing `limit` rows per page.
    pub fn new(limit: usize) -> GridResult<Self> {
        if limit == 0 {
            return Err(GridError::InvalidLimit(limit));
        }
        Ok(Self {
            rows: Vec::new(),
            filters: Filters::new(),
            ordering: OrderSpec::unsorted(),
            limit,
            offset: 0,
            filter_fn: None,
            order_fn: None,
            filtered_ordered_rows: Vec::new(),
            visible_rows: Vec::new(),
            batch_depth: 0,
            content_dirty: false,
            window_dirty: false,
            recompute_count: 0,
        })
    }

    /// Create an empty grid from configured defaults.
    pub fn from_defaults(defaults: &GridDefaults) -> GridResult<Self> {
        let mut grid = Self::new(defaults.limit)?;
        grid.filters = defaults.filters.clone();
        grid.ordering = defaults.ordering.clone();
        Ok(grid)
    }

    /// Use a custom filter instead of passing every row through.
    pub fn with_filter_fn(mut self, filter_fn: FilterFn) -> Self {
        self.filter_fn = Some(filter_fn);
        self.content_changed();
        self
    }

    /// Use a custom ordering instead of the type-inferred comparator.
    pub fn with_order_fn(mut self, order_fn: OrderFn) -> Self {
        self.order_fn = Some(order_fn);
        self.content_changed();
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn ordering(&self) -> &OrderSpec {
        &self.ordering
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Every row surviving the filter, in display order
    pub fn filtered_ordered_rows(&self) -> &[Row] {
        &self.filtered_ordered_rows
    }

    /// The current page of `filtered_ordered_rows`
    pub fn visible_rows(&self) -> &[Row] {
        &self.visible_rows
    }

    /// Number of filter/sort passes run so far
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Replace the full row set and return to the first page.
    ///
    /// The visible page is set straight from the first `limit` new rows; the
    /// filter/sort pass follows immediately, or when the enclosing
    /// [`batch`](Self::batch) ends.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.offset = 0;
        self.visible_rows = self.rows.iter().take(self.limit).cloned().collect();
        self.window_dirty = false;
        self.content_changed();
    }

    /// Change the page size, snapping the offset down to a page boundary.
    ///
    /// A zero limit is ignored.
    pub fn set_limit(&mut self, limit: usize) {
        if limit == 0 {
            tracing::warn!("Ignoring zero page size");
            return;
        }
        self.limit = limit;
        self.offset = normalize_offset(limit, self.offset);
        self.window_changed();
    }

    /// Move the page window. The offset is taken as given.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
        self.window_changed();
    }

    /// Jump to a 1-indexed page.
    pub fn go_to_page(&mut self, page: usize) {
        self.set_offset(page_offset(page.max(1), self.limit));
    }

    pub fn set_order(&mut self, ordering: OrderSpec, reset_offset: bool) {
        self.ordering = ordering;
        if reset_offset {
            self.offset = 0;
        }
        self.content_changed();
    }

    /// Header click: flip the direction of the current column or sort by a new one.
    pub fn toggle_order(&mut self, column: &str, reset_offset: bool) {
        let ordering = self.ordering.toggled(column);
        self.set_order(ordering, reset_offset);
    }

    /// Replace the filters wholesale.
    pub fn apply_filters(&mut self, filters: Filters, reset_offset: bool) {
        self.filters = filters;
        if reset_offset {
            self.offset = 0;
        }
        self.content_changed();
    }

    /// Run several mutations as one.
    ///
    /// The filter/sort pass runs at most once, when the outermost batch ends.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;

        if self.batch_depth == 0 {
            if self.content_dirty {
                self.recompute();
            } else if self.window_dirty {
                self.reslice();
            }
        }
        result
    }

    /// Rows surviving the filter
    pub fn total_count(&self) -> usize {
        self.filtered_ordered_rows.len()
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(
            self.limit,
            self.offset,
            Some(self.total_count() as u64),
            self.visible_rows.len(),
        )
    }

    pub fn visible_pages(&self, max_visible_pages: usize) -> Vec<PageItem> {
        self.page_info().visible_pages(max_visible_pages)
    }

    fn content_changed(&mut self) {
        self.content_dirty = true;
        if self.batch_depth == 0 {
            self.recompute();
        }
    }

    fn window_changed(&mut self) {
        if self.batch_depth == 0 {
            self.reslice();
        } else {
            self.window_dirty = true;
        }
    }

    fn recompute(&mut self) {
        self.filtered_ordered_rows = filter_and_order(
            &self.rows,
            &self.filters,
            &self.ordering,
            self.filter_fn.as_ref(),
            self.order_fn.as_ref(),
        );
        self.recompute_count += 1;
        self.content_dirty = false;
        tracing::debug!(
            rows = self.rows.len(),
            matched = self.filtered_ordered_rows.len(),
            "Recomputed grid rows"
        );
        self.reslice();
    }

    fn reslice(&mut self) {
        let len = self.filtered_ordered_rows.len();
        let start = self.offset.min(len);
        let end = self.offset.saturating_add(self.limit).min(len);
        self.visible_rows = self.filtered_ordered_rows[start..end].to_vec();
        self.window_dirty = false;
    }
}

impl std::fmt::Debug for GridState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridState")
            .field("rows", &self.rows.len())
            .field("filters", &self.filters)
            .field("ordering", &self.ordering)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("visible_rows", &self.visible_rows.len())
            .finish_non_exhaustive()
    }
}
