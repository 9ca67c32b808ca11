//! Gridkit Core - Row model and pure algorithms for data grids
//!
//! This crate provides the pieces every grid variant shares. It defines:
//!
//! - `Value`, `Row`, `RowId`, `Filters` - the row and filter model
//! - `OrderSpec`, `SortDirection`, `ValuesType` - sort state
//! - `compare` - null-safe, direction-aware comparators
//! - `engine` - the filter/sort pass producing the derived row set
//! - `pagination` - offset/limit arithmetic and the page-number window
//!
//! Nothing in here performs I/O or holds state between calls.

pub mod compare;
pub mod engine;
mod error;
pub mod pagination;
mod types;

pub use compare::{Comparator, compare_booleans, compare_empty, compare_numbers, compare_strings};
pub use engine::{FilterFn, OrderFn, contains_filter, filter_and_order};
pub use error::*;
pub use pagination::{
    DEFAULT_MAX_VISIBLE_PAGES, PageInfo, PageItem, current_page, normalize_offset, page_count,
    page_offset, visible_pages,
};
pub use types::*;
