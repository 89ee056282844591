//! Application assembly: the top-level builder and the runnable context it
//! produces.
//!
//! The builder accumulates deferred configuration closures keyed by module;
//! `run()` replays them in registration order, materializes the configured
//! pieces (logging, views, routes, dispatcher, server), and returns an
//! [`AppContext`] whose only teardown operation is a blocking, idempotent
//! [`close()`](AppContext::close).

mod builder;
mod context;

pub use builder::{application, AppBuilder};
pub use context::{AppContext, Lifecycle};
