//! Server-backed grid store
//!
//! Holds the request parameters (filters, ordering, limit, offset) and the
//! last page the server returned. Setters only record state; fetching is the
//! job of [`GridLoader`](super::GridLoader).

use std::sync::Arc;

use gridkit_core::{
    Filters, OrderSpec, PageInfo, PageItem, Row, RowId, normalize_offset, page_offset,
};
use indexmap::IndexSet;

use super::source::{FetchRequest, FetchResponse, OrderClause};
use crate::defaults::GridDefaults;
use crate::query_string::{RestoredState, encode};

/// How [`AsyncGridState::update_row`] finds its target row
#[derive(Clone)]
pub enum RowMatcher {
    /// The row whose value in this column equals the update's value there
    Key(String),
    /// The first row the predicate accepts
    Predicate(Arc<dyn Fn(&Row) -> bool + Send + Sync>),
}

impl RowMatcher {
    pub fn key(column: impl Into<String>) -> Self {
        Self::Key(column.into())
    }

    pub fn predicate(f: impl Fn(&Row) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    fn matches(&self, row: &Row, updates: &Row) -> bool {
        match self {
            Self::Key(column) => updates
                .get(column)
                .is_some_and(|wanted| row.get(column) == Some(wanted)),
            Self::Predicate(predicate) => predicate(row),
        }
    }
}

impl std::fmt::Debug for RowMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(column) => f.debug_tuple("Key").field(column).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AsyncGridState {
    filters: Filters,
    ordering: OrderSpec,
    limit: usize,
    offset: usize,
    default_filters: Filters,

    rows: Vec<Row>,
    total_count: Option<u64>,
    permissions: Option<serde_json::Value>,

    loading: bool,
    loading_error: bool,
    draws_count: u64,

    selected_rows: IndexSet<RowId>,
}

impl AsyncGridState {
    pub fn new(defaults: &GridDefaults) -> Self {
        Self {
            filters: defaults.filters.clone(),
            ordering: defaults.ordering.clone(),
            limit: defaults.limit.max(1),
            offset: 0,
            default_filters: defaults.filters.clone(),
            rows: Vec::new(),
            total_count: None,
            permissions: None,
            loading: false,
            loading_error: false,
            draws_count: 0,
            selected_rows: IndexSet::new(),
        }
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

    /// The current page as last returned by the server
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Size of the full filtered result, `None` until the first fetch settles
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn permissions(&self) -> Option<&serde_json::Value> {
        self.permissions.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn loading_error(&self) -> bool {
        self.loading_error
    }

    /// Settled fetches so far
    pub fn draws_count(&self) -> u64 {
        self.draws_count
    }

    pub fn selected_rows(&self) -> impl Iterator<Item = &RowId> {
        self.selected_rows.iter()
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected_rows.contains(id)
    }

    pub fn set_order(&mut self, ordering: OrderSpec, reset_offset: bool) {
        self.ordering = ordering;
        if reset_offset {
            self.offset = 0;
        }
    }

    /// Header click: flip the direction of the current column or sort by a new one.
    pub fn toggle_order(&mut self, column: &str, reset_offset: bool) {
        let ordering = self.ordering.toggled(column);
        self.set_order(ordering, reset_offset);
    }

    pub fn apply_filters(&mut self, filters: Filters, reset_offset: bool) {
        self.filters = filters;
        if reset_offset {
            self.offset = 0;
        }
    }

    /// Restore the configured default filters and return to the first page.
    pub fn reset_filters(&mut self) {
        self.filters = self.default_filters.clone();
        self.offset = 0;
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
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Jump to a 1-indexed page.
    pub fn go_to_page(&mut self, page: usize) {
        self.offset = page_offset(page.max(1), self.limit);
    }

    /// Replace the current page. Counts as one draw.
    pub fn set_rows(&mut self, rows: Vec<Row>, total_count: Option<u64>) {
        self.rows = rows;
        if total_count.is_some() {
            self.total_count = total_count;
        }
        self.draws_count += 1;
    }

    pub fn set_total_count(&mut self, total_count: Option<u64>) {
        self.total_count = total_count;
    }

    /// Transform the current page locally, without refetching.
    pub fn update_rows(&mut self, f: impl FnOnce(Vec<Row>) -> Vec<Row>) {
        let rows = std::mem::take(&mut self.rows);
        self.rows = f(rows);
    }

    /// Patch the first row `matcher` selects.
    ///
    /// `updates` is merged into the row, or replaces it when `replace` is set.
    /// Returns whether a row matched; no match leaves the page untouched.
    pub fn update_row(&mut self, updates: Row, matcher: &RowMatcher, replace: bool) -> bool {
        let Some(row) = self
            .rows
            .iter_mut()
            .find(|row| matcher.matches(row, &updates))
        else {
            tracing::debug!(?matcher, "No row matched update");
            return false;
        };

        if replace {
            *row = updates;
        } else {
            row.merge(&updates);
        }
        true
    }

    pub fn select_row(&mut self, id: RowId, selected: bool) {
        if selected {
            self.selected_rows.insert(id);
        } else {
            self.selected_rows.shift_remove(&id);
        }
    }

    pub fn set_selected_rows(&mut self, ids: impl IntoIterator<Item = RowId>) {
        self.selected_rows = ids.into_iter().collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected_rows.clear();
    }

    /// Mark a fetch as started. A silent load keeps the loading flag down.
    pub fn begin_load(&mut self, silent: bool) {
        if !silent {
            self.loading = true;
        }
    }

    /// Apply a successful fetch.
    pub fn finish_load(&mut self, response: FetchResponse) {
        self.permissions = response.permissions;
        self.set_rows(response.records, Some(response.count));
        self.loading = false;
        self.loading_error = false;
    }

    /// Record a failed fetch, keeping the last good page.
    pub fn fail_load(&mut self) {
        self.loading = false;
        self.loading_error = true;
        self.draws_count += 1;
    }

    /// Drop the loading flag of a fetch that was cancelled.
    pub fn cancel_load(&mut self) {
        self.loading = false;
    }

    /// Parameters for fetching the current page
    pub fn fetch_request(&self) -> FetchRequest {
        let order = self
            .ordering
            .column
            .iter()
            .map(|column| OrderClause {
                column: column.clone(),
                direction: self.ordering.direction,
            })
            .collect();

        FetchRequest {
            limit: self.limit,
            offset: self.offset,
            order,
            filters: self.filters.without_empty(),
        }
    }

    /// Overwrite the request parameters with state restored from a URL.
    pub fn apply_restored(&mut self, restored: &RestoredState) {
        self.limit = restored.limit.max(1);
        self.offset = restored.offset;
        self.ordering = restored.ordering.clone();
        self.filters = restored.filters.clone();
    }

    /// Query-string token for the current request parameters
    pub fn query_token(&self, default_limit: usize) -> String {
        encode(
            self.limit,
            self.offset,
            self.ordering.column.as_deref(),
            self.ordering.direction,
            &self.filters,
            default_limit,
        )
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(self.limit, self.offset, self.total_count, self.rows.len())
    }

    pub fn visible_pages(&self, max_visible_pages: usize) -> Vec<PageItem> {
        self.page_info().visible_pages(max_visible_pages)
    }
}

impl Default for AsyncGridState {
    fn default() -> Self {
        Self::new(&GridDefaults::default())
    }
}
