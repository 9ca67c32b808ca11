//! Server-backed grid
//!
//! - [`AsyncGridState`] holds request parameters and the last fetched page.
//! - [`DataSource`] is the remote end, [`GridLoader`] drives fetches against
//!   it and discards superseded responses.
//! - [`AsyncGrid`] is a mounted grid: state, loader, URL sync and auto-reload
//!   wired together, torn down on [`shutdown`](AsyncGrid::shutdown) or drop.

mod grid;
mod loader;
mod source;
mod state;

pub use grid::{AsyncGrid, AsyncGridBuilder};
pub use loader::GridLoader;
pub use source::{DataSource, FetchRequest, FetchResponse, FnSource, OrderClause, source_fn};
pub use state::{AsyncGridState, RowMatcher};
