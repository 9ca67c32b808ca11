//! Gridkit Polling - Named periodic tasks with back-off
//!
//! A [`PollingRegistry`] runs async handlers on an interval, one timer per
//! name. A failing handler pushes its next run further out (see
//! [`LinearBackoff`]); any success brings it back to the nominal interval.
//!
//! # Example
//!
//! ```ignore
//! use gridkit_polling::PollingRegistry;
//! use std::time::Duration;
//!
//! let registry = PollingRegistry::new();
//! registry.start_polling("orders", Duration::from_secs(30), || async {
//!     refresh_orders().await
//! }, false);
//!
//! // later
//! registry.stop_polling("orders");
//! ```

mod backoff;
mod error;
mod registry;


pub use backoff::{LinearBackoff, backoff_delay};
pub use error::{PollError, PollResult};
pub use registry::{PollStatus, PollingRegistry};
