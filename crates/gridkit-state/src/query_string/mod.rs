//! Grid state in the address bar
//!
//! [`encode`]/[`decode`] map paging, ordering and filters to a compact JSON
//! token. [`QueryStringSync`] mirrors that token into a URL query parameter
//! and back, comparing against the last token it saw so a write in one
//! direction never echoes back through the other.
//!
//! # Example
//!
//! ```ignore
//! use gridkit_state::query_string::{QueryStringSync, encode};
//!
//! let mut sync = QueryStringSync::new("state");
//! let token = encode(50, 20, Some("name"), SortDirection::Desc, &filters, 25);
//! sync.push(&mut url, &token);
//!
//! // after back/forward navigation
//! if let Some(restored) = sync.pull(&url, &defaults) {
//!     state.apply_restored(&restored);
//! }
//! ```

mod codec;
mod location;
mod sync;

pub use codec::{EMPTY_TOKEN, QueryStateToken, decode, encode};
pub use location::{Location, MemoryLocation};
pub use sync::{DEFAULT_QUERY_PARAM, QueryStringSync, RestoredState};
