use gridkit_core::{DEFAULT_MAX_VISIBLE_PAGES, Filters, OrderSpec};

/// Configured starting point of a grid.
///
/// Used when a grid mounts, when filters are reset, and for every field a
/// restored URL token leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefaults {
    pub limit: usize,
    pub ordering: OrderSpec,
    pub filters: Filters,
    /// Entries in the page-number strip
    pub max_visible_pages: usize,
    /// Page sizes a user may pick; empty allows any size
    pub page_sizes: Vec<usize>,
}

impl GridDefaults {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            ordering: OrderSpec::unsorted(),
            filters: Filters::new(),
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
            page_sizes: Vec::new(),
        }
    }

    pub fn with_ordering(mut self, ordering: OrderSpec) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_max_visible_pages(mut self, max_visible_pages: usize) -> Self {
        self.max_visible_pages = max_visible_pages;
        self
    }

    pub fn with_page_sizes(mut self, page_sizes: impl IntoIterator<Item = usize>) -> Self {
        self.page_sizes = page_sizes.into_iter().filter(|size| *size > 0).collect();
        self
    }

    /// Snap a requested page size to the closest offered one.
    ///
    /// Zero passes through untouched so the store can reject it. Ties go to
    /// the smaller size.
    pub fn page_size(&self, requested: usize) -> usize {
        if requested == 0 || self.page_sizes.is_empty() || self.page_sizes.contains(&requested) {
            return requested;
        }
        self.page_sizes
            .iter()
            .copied()
            .min_by_key(|size| (size.abs_diff(requested), *size))
            .unwrap_or(requested)
    }
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self::new(25)
    }
}
