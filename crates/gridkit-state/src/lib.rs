//! Gridkit State - Grid stores and URL synchronisation
//!
//! Two store variants share one vocabulary (filters, ordering, limit, offset):
//!
//! - [`GridState`] owns the full row set and derives the visible page
//!   synchronously through the filter/sort engine.
//! - [`AsyncGridState`] holds only the current page; a [`GridLoader`] fetches
//!   pages from a [`DataSource`] whenever the state changes, and [`AsyncGrid`]
//!   wires the store, loader, address-bar sync and auto-reload together.
//!
//! [`query_string`] turns the paging/ordering/filter state into a compact
//! token stored in a URL query parameter and back.

pub mod async_grid;
mod defaults;
mod grid;
pub mod query_string;

pub use async_grid::{
    AsyncGrid, AsyncGridBuilder, AsyncGridState, DataSource, FetchRequest, FetchResponse,
    GridLoader, OrderClause, RowMatcher, source_fn,
};
pub use defaults::GridDefaults;
pub use grid::GridState;
pub use query_string::{
    DEFAULT_QUERY_PARAM, Location, MemoryLocation, QueryStateToken, QueryStringSync,
    RestoredState,
};

pub use gridkit_polling::PollingRegistry;

pub use gridkit_core::{
    Filters, GridError, GridResult, OrderSpec, PageInfo, PageItem, Row, RowId, SortDirection,
    Value, ValuesType,
};
